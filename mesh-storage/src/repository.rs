//! Typed access to a [`SnapshotStore`].

use crate::error::StorageResult;
use crate::store::{SnapshotStore, StoredSnapshot};
use mesh_crdt::{AnyCrdt, Crdt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Persists and restores CRDTs by key.
///
/// The store only sees [`StoredSnapshot`]s; decoding back into a concrete
/// type (or into [`AnyCrdt`] when the type is only known at runtime)
/// happens here.
pub struct CrdtRepository<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for CrdtRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> CrdtRepository<S>
where
    S: SnapshotStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Saves `crdt` under `key`, replacing what was there.
    pub async fn persist<C: Crdt>(&self, key: &str, crdt: &C) -> StorageResult<()> {
        let snapshot = StoredSnapshot::capture(crdt)?;
        self.store.save(key, snapshot).await
    }

    /// Loads the CRDT under `key` as a `C`.
    ///
    /// Returns `Ok(None)` for a missing key and a kind mismatch error when
    /// the key holds a different CRDT type.
    pub async fn restore<C: Crdt>(&self, key: &str) -> StorageResult<Option<C>> {
        match self.store.load(key).await? {
            Some(snapshot) => snapshot.decode().map(Some),
            None => Ok(None),
        }
    }

    /// Loads the CRDT under `key` without knowing its type in advance.
    pub async fn restore_any<T>(&self, key: &str) -> StorageResult<Option<AnyCrdt<T>>>
    where
        T: Ord + Clone + Serialize + DeserializeOwned,
    {
        match self.store.load(key).await? {
            Some(snapshot) => Ok(Some(AnyCrdt::decode(&snapshot.data)?)),
            None => Ok(None),
        }
    }

    /// Merges `crdt` into whatever is stored under `key` and saves the result.
    ///
    /// With nothing stored, `crdt` itself is saved. Returns the state written.
    pub async fn merge_persist<C: Crdt>(&self, key: &str, crdt: &C) -> StorageResult<C> {
        let merged = match self.restore::<C>(key).await? {
            Some(stored) => {
                debug!("Merging into stored {} at {}", C::KIND, key);
                stored.merge(crdt)
            }
            None => crdt.clone(),
        };
        self.persist(key, &merged).await?;
        info!("Persisted {} at {} (version {})", C::KIND, key, merged.version());
        Ok(merged)
    }

    /// Every stored key, ascending.
    pub async fn keys(&self) -> StorageResult<Vec<String>> {
        self.store.get_all_keys().await
    }

    /// Deletes `key`.
    pub async fn remove(&self, key: &str) -> StorageResult<()> {
        self.store.delete(key).await
    }
}
