//! Grow-only Set (G-Set).
//!
//! The simplest set CRDT: elements can be added but never removed, and merge
//! is set union. It is the monotone building block the observed-remove set
//! refines with per-add tombstones.

use crate::kind::CrdtKind;
use crate::snapshot::Crdt;
use mesh_types::NodeId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A Grow-only Set.
///
/// Elements are kept ordered so snapshots of equal sets serialize to
/// identical JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GSet<T>
where
    T: Ord + Clone,
{
    items: BTreeSet<T>,
    node_id: NodeId,
    version: u64,
}

impl<T> GSet<T>
where
    T: Ord + Clone,
{
    /// Creates an empty set owned by `node_id`.
    #[must_use]
    pub fn new(node_id: impl Into<NodeId>) -> Self {
        Self {
            items: BTreeSet::new(),
            node_id: node_id.into(),
            version: 0,
        }
    }

    /// Creates a set holding `items`, as if each had been added once.
    #[must_use]
    pub fn from_items(node_id: impl Into<NodeId>, items: impl IntoIterator<Item = T>) -> Self {
        let items: BTreeSet<T> = items.into_iter().collect();
        let version = items.len() as u64;
        Self {
            items,
            node_id: node_id.into(),
            version,
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

    /// Returns a new set that also contains `item`.
    #[must_use]
    pub fn add(&self, item: T) -> Self {
        let mut items = self.items.clone();
        items.insert(item);
        Self {
            items,
            node_id: self.node_id.clone(),
            version: self.version + 1,
        }
    }

    /// Returns the union of both sets.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut items = self.items.clone();
        items.extend(other.items.iter().cloned());
        Self {
            items,
            node_id: self.node_id.clone(),
            version: self.version.max(other.version) + 1,
        }
    }

    /// Returns true if the set contains `item`.
    #[must_use]
    pub fn has(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Returns the elements in ascending order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    /// Iterates over the elements in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the set has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> PartialEq for GSet<T>
where
    T: Ord + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T> Eq for GSet<T> where T: Ord + Clone {}

impl<T> Crdt for GSet<T>
where
    T: Ord + Clone + Serialize + DeserializeOwned,
{
    const KIND: CrdtKind = CrdtKind::GSet;

    fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn merge(&self, other: &Self) -> Self {
        GSet::merge(self, other)
    }
}
