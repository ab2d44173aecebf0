//! The snapshot store contract.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mesh_crdt::{Crdt, CrdtError, CrdtKind, CrdtResult};
use mesh_types::NodeId;
use serde::{Deserialize, Serialize};

/// A serialized CRDT as kept by a [`SnapshotStore`].
///
/// `kind`, `node_id` and `version` are lifted out of `data` so stores can
/// index them without parsing the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSnapshot {
    pub kind: CrdtKind,
    pub node_id: NodeId,
    pub version: u64,
    /// Tagged JSON snapshot as produced by [`Crdt::to_snapshot`].
    pub data: String,
    pub saved_at: DateTime<Utc>,
}

impl StoredSnapshot {
    /// Captures the current state of `crdt`.
    pub fn capture<C: Crdt>(crdt: &C) -> CrdtResult<Self> {
        Ok(Self {
            kind: C::KIND,
            node_id: crdt.node_id().clone(),
            version: crdt.version(),
            data: crdt.to_snapshot()?,
            saved_at: Utc::now(),
        })
    }

    /// Decodes the snapshot into `C`, rejecting other kinds up front.
    pub fn decode<C: Crdt>(&self) -> StorageResult<C> {
        if self.kind != C::KIND {
            return Err(CrdtError::KindMismatch {
                expected: C::KIND,
                found: self.kind,
            }
            .into());
        }
        Ok(C::from_snapshot(&self.data)?)
    }
}

/// Rejects keys no store can hold.
pub(crate) fn check_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidData("snapshot key must not be empty".into()));
    }
    Ok(())
}

/// Key-value persistence for CRDT snapshots.
///
/// Implementations own their write atomicity; callers assume nothing beyond
/// a single `save` being all-or-nothing.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Stores `snapshot` under `key`, replacing any previous value.
    async fn save(&self, key: &str, snapshot: StoredSnapshot) -> StorageResult<()>;

    /// Loads the snapshot under `key`, if any.
    async fn load(&self, key: &str) -> StorageResult<Option<StoredSnapshot>>;

    /// Returns every stored key in ascending order.
    async fn get_all_keys(&self) -> StorageResult<Vec<String>>;

    /// Removes `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
