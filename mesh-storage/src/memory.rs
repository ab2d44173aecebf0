//! In-process snapshot store.

use crate::error::StorageResult;
use crate::store::{check_key, SnapshotStore, StoredSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// A [`SnapshotStore`] backed by a map. Contents die with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<HashMap<String, StoredSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn save(&self, key: &str, snapshot: StoredSnapshot) -> StorageResult<()> {
        check_key(key)?;
        debug!("Saving {} snapshot {} (version {})", snapshot.kind, key, snapshot.version);
        self.snapshots.write().await.insert(key.to_string(), snapshot);
        Ok(())
    }

    async fn load(&self, key: &str) -> StorageResult<Option<StoredSnapshot>> {
        Ok(self.snapshots.read().await.get(key).cloned())
    }

    async fn get_all_keys(&self) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self.snapshots.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if self.snapshots.write().await.remove(key).is_some() {
            debug!("Deleted snapshot {}", key);
        }
        Ok(())
    }
}
