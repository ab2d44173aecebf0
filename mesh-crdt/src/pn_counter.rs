//! Positive-Negative Counter CRDT.
//!
//! A PN-Counter supports both increment and decrement operations across
//! distributed replicas. It keeps two grow-only maps (increments and
//! decrements) keyed by node id; each replica only ever raises its own slots.
//! The value is `sum(increments) - sum(decrements)`.
//!
//! Because every slot is monotonic, merging by per-slot maximum cannot lose a
//! decrement: a peer that has not seen it has a smaller (not larger)
//! decrement slot.

use crate::kind::CrdtKind;
use crate::snapshot::Crdt;
use mesh_types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A Positive-Negative Counter CRDT.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PNCounter {
    increments: BTreeMap<NodeId, u64>,
    decrements: BTreeMap<NodeId, u64>,
    node_id: NodeId,
    version: u64,
}

impl PNCounter {
    /// Creates a new counter with value 0.
    #[must_use]
    pub fn new(node_id: impl Into<NodeId>) -> Self {
        Self {
            increments: BTreeMap::new(),
            decrements: BTreeMap::new(),
            node_id: node_id.into(),
            version: 0,
        }
    }

    /// Returns the owning replica.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Returns the local version counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Adds `amount` to this replica's increment slot.
    #[must_use]
    pub fn increment(&self, amount: u64) -> Self {
        let mut next = self.bumped();
        let slot = next.increments.entry(self.node_id.clone()).or_insert(0);
        *slot = slot.saturating_add(amount);
        next
    }

    /// Adds `amount` to this replica's decrement slot.
    #[must_use]
    pub fn decrement(&self, amount: u64) -> Self {
        let mut next = self.bumped();
        let slot = next.decrements.entry(self.node_id.clone()).or_insert(0);
        *slot = slot.saturating_add(amount);
        next
    }

    /// Shorthand for `increment(1)`.
    #[must_use]
    pub fn incr(&self) -> Self {
        self.increment(1)
    }

    /// Shorthand for `decrement(1)`.
    #[must_use]
    pub fn decr(&self) -> Self {
        self.decrement(1)
    }

    /// Returns the current counter value (may be negative).
    ///
    /// Saturates at the bounds of `i64`.
    #[must_use]
    pub fn value(&self) -> i64 {
        let pos: i128 = self.increments.values().map(|&n| i128::from(n)).sum();
        let neg: i128 = self.decrements.values().map(|&n| i128::from(n)).sum();
        (pos - neg).clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    /// Returns the `(increments, decrements)` contributed by `node`.
    #[must_use]
    pub fn contribution(&self, node: &NodeId) -> (u64, u64) {
        (
            self.increments.get(node).copied().unwrap_or(0),
            self.decrements.get(node).copied().unwrap_or(0),
        )
    }

    /// Merges by taking the per-replica maximum of every slot.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            increments: max_slots(&self.increments, &other.increments),
            decrements: max_slots(&self.decrements, &other.decrements),
            node_id: self.node_id.clone(),
            version: self.version.max(other.version) + 1,
        }
    }

    fn bumped(&self) -> Self {
        Self {
            version: self.version + 1,
            ..self.clone()
        }
    }
}

fn max_slots(ours: &BTreeMap<NodeId, u64>, theirs: &BTreeMap<NodeId, u64>) -> BTreeMap<NodeId, u64> {
    let mut merged = ours.clone();
    for (node, &count) in theirs {
        let entry = merged.entry(node.clone()).or_insert(0);
        *entry = (*entry).max(count);
    }
    merged
}

fn slots_equal(a: &BTreeMap<NodeId, u64>, b: &BTreeMap<NodeId, u64>) -> bool {
    // A missing slot counts as zero.
    let nodes: BTreeSet<&NodeId> = a.keys().chain(b.keys()).collect();
    nodes.into_iter().all(|node| {
        a.get(node).copied().unwrap_or(0) == b.get(node).copied().unwrap_or(0)
    })
}

impl PartialEq for PNCounter {
    fn eq(&self, other: &Self) -> bool {
        slots_equal(&self.increments, &other.increments)
            && slots_equal(&self.decrements, &other.decrements)
    }
}

impl Eq for PNCounter {}

impl Crdt for PNCounter {
    const KIND: CrdtKind = CrdtKind::Counter;

    fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn merge(&self, other: &Self) -> Self {
        PNCounter::merge(self, other)
    }
}
