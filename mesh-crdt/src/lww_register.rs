//! Last-Writer-Wins Register (LWW-Register).
//!
//! A CRDT that stores a single value. Concurrent writes are resolved by
//! comparing wall-clock timestamps — the write with the highest timestamp wins.
//! Equal timestamps fall back to the lexicographically greater node id.
//!
//! Use cases:
//! - Single-value properties (display name, status, settings)
//! - Any field where "last write wins" semantics are acceptable

use crate::kind::CrdtKind;
use crate::snapshot::Crdt;
use mesh_types::{NodeId, Timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A Last-Writer-Wins Register.
///
/// Stores a value of type `T` along with the metadata merge needs: the
/// timestamp of the last write and the node that made it. The writer is
/// tracked apart from the owning replica, which never changes on merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LWWRegister<T> {
    /// The current value.
    value: T,
    /// Wall-clock time of the last write.
    timestamp: Timestamp,
    /// Replica that owns this register.
    node_id: NodeId,
    /// Replica that performed the last write.
    writer: NodeId,
    /// Local version counter.
    version: u64,
}

impl<T> LWWRegister<T> {
    /// Creates a new register with the given initial value, stamped now.
    #[must_use]
    pub fn new(value: T, node_id: impl Into<NodeId>) -> Self {
        Self::with_timestamp(value, Timestamp::now(), node_id)
    }

    /// Creates a register with explicit timestamp (for testing or replay).
    #[must_use]
    pub fn with_timestamp(value: T, timestamp: Timestamp, node_id: impl Into<NodeId>) -> Self {
        let node_id = node_id.into();
        Self {
            value,
            timestamp,
            writer: node_id.clone(),
            node_id,
            version: 0,
        }
    }

    /// Returns a reference to the current value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the timestamp of the last write.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns the owning replica.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Returns the replica that performed the last write.
    #[must_use]
    pub fn writer(&self) -> &NodeId {
        &self.writer
    }

    /// Returns the local version counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Records a new value stamped with the current time.
    ///
    /// The new timestamp is strictly greater than the previous one even if
    /// the system clock has not advanced, so a later local write always
    /// beats an earlier one.
    #[must_use]
    pub fn set(&self, value: T) -> Self {
        Self {
            value,
            timestamp: self.timestamp.tick(),
            node_id: self.node_id.clone(),
            writer: self.node_id.clone(),
            version: self.version + 1,
        }
    }

    /// Returns true if `other` wins against `self` under the
    /// `(timestamp, writer)` total order.
    fn loses_to(&self, other: &Self) -> bool {
        (other.timestamp, &other.writer) > (self.timestamp, &self.writer)
    }
}

impl<T: Clone> LWWRegister<T> {
    /// Merges another register, taking the winning write.
    ///
    /// Higher timestamp wins; on a tie the greater writer id wins. The result
    /// keeps this replica as owner and does not bump the version beyond the
    /// larger of the two. This operation is:
    /// - Commutative: merge(a, b) == merge(b, a)
    /// - Associative: merge(merge(a, b), c) == merge(a, merge(b, c))
    /// - Idempotent: merge(a, a) == a
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let winner = if self.loses_to(other) { other } else { self };
        Self {
            value: winner.value.clone(),
            timestamp: winner.timestamp,
            node_id: self.node_id.clone(),
            writer: winner.writer.clone(),
            version: self.version.max(other.version),
        }
    }
}

impl<T: PartialEq> PartialEq for LWWRegister<T> {
    fn eq(&self, other: &Self) -> bool {
        // Owner and version are local bookkeeping and do not take part.
        self.value == other.value
            && self.timestamp == other.timestamp
            && self.writer == other.writer
    }
}

impl<T: Eq> Eq for LWWRegister<T> {}

impl<T> Crdt for LWWRegister<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    const KIND: CrdtKind = CrdtKind::LwwRegister;

    fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn merge(&self, other: &Self) -> Self {
        LWWRegister::merge(self, other)
    }
}
