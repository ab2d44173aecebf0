//! Observed-Remove Set (OR-Set).
//!
//! A CRDT set that supports both add and remove. Every add creates a tagged
//! item with a fresh [`Tag`]; remove tombstones the items it has observed.
//! An add that a replica had not seen when it removed the value survives,
//! and re-adding a removed value creates a new, independently visible item.
//!
//! Tombstones are sticky: once an item is tombstoned on any replica, merge
//! keeps it tombstoned everywhere.
//!
//! Use cases:
//! - Membership lists
//! - Tags and labels
//! - Any collection where removal must win only over what was observed

use crate::error::{CrdtError, CrdtResult};
use crate::kind::CrdtKind;
use crate::snapshot::Crdt;
use mesh_types::{NodeId, Tag};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One add event in an [`ORSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedItem<T> {
    /// The added value.
    pub value: T,
    /// Identity of the add event; merge deduplicates by this, not by value.
    pub id: Tag,
    /// Set once the item has been removed. Never reverts.
    #[serde(default, skip_serializing_if = "is_false")]
    pub tombstone: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// An Observed-Remove Set.
///
/// Items keep their insertion order across merges (local items first, then
/// items first seen from peers). The order is stable but carries no global
/// meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ORSet<T> {
    items: Vec<TaggedItem<T>>,
    node_id: NodeId,
    version: u64,
}

impl<T> ORSet<T>
where
    T: Clone + PartialEq,
{
    /// Creates an empty set owned by `node_id`.
    #[must_use]
    pub fn new(node_id: impl Into<NodeId>) -> Self {
        Self {
            items: Vec::new(),
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

    /// Adds `value` under a fresh tag.
    ///
    /// Earlier items with the same value are not affected.
    #[must_use]
    pub fn add(&self, value: T) -> Self {
        self.add_with_tag(value, Tag::new())
    }

    /// Adds `value` under a caller-supplied tag (for replay).
    ///
    /// If the tag is already present the set is returned unchanged.
    #[must_use]
    pub fn add_with_tag(&self, value: T, id: Tag) -> Self {
        if self.items.iter().any(|item| item.id == id) {
            return self.clone();
        }
        let mut items = self.items.clone();
        items.push(TaggedItem {
            value,
            id,
            tombstone: false,
        });
        Self {
            items,
            node_id: self.node_id.clone(),
            version: self.version + 1,
        }
    }

    /// Tombstones every currently visible item holding `value`.
    ///
    /// Items added later, locally or by a peer that had not seen this
    /// removal, stay visible.
    #[must_use]
    pub fn remove(&self, value: &T) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if !item.tombstone && item.value == *value {
                    item.tombstone = true;
                }
                item
            })
            .collect();
        Self {
            items,
            node_id: self.node_id.clone(),
            version: self.version + 1,
        }
    }

    /// Unions both sides by item id; a tombstone on either side wins.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut items = self.items.clone();
        let mut index: HashMap<Tag, usize> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id, i))
            .collect();

        for theirs in &other.items {
            match index.get(&theirs.id) {
                Some(&i) => items[i].tombstone |= theirs.tombstone,
                None => {
                    index.insert(theirs.id, items.len());
                    items.push(theirs.clone());
                }
            }
        }

        Self {
            items,
            node_id: self.node_id.clone(),
            version: self.version.max(other.version) + 1,
        }
    }

    /// Returns true if some visible item holds `value`.
    #[must_use]
    pub fn has(&self, value: &T) -> bool {
        self.visible().any(|item| item.value == *value)
    }

    /// Returns the values of all visible items, in item order.
    ///
    /// A value added more than once appears once per live add.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.visible().map(|item| item.value.clone()).collect()
    }

    /// Returns every item, tombstoned ones included.
    #[must_use]
    pub fn items(&self) -> &[TaggedItem<T>] {
        &self.items
    }

    /// Returns the number of visible items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visible().count()
    }

    /// Returns true if no item is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of tombstoned items retained for merging.
    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.items.iter().filter(|item| item.tombstone).count()
    }

    fn visible(&self) -> impl Iterator<Item = &TaggedItem<T>> {
        self.items.iter().filter(|item| !item.tombstone)
    }
}

impl<T> PartialEq for ORSet<T>
where
    T: PartialEq,
{
    /// Compares the sets of tagged items, ignoring item order.
    fn eq(&self, other: &Self) -> bool {
        if self.items.len() != other.items.len() {
            return false;
        }
        let theirs: HashMap<Tag, &TaggedItem<T>> =
            other.items.iter().map(|item| (item.id, item)).collect();
        self.items
            .iter()
            .all(|item| theirs.get(&item.id).is_some_and(|t| *t == item))
    }
}

impl<T> Crdt for ORSet<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned,
{
    const KIND: CrdtKind = CrdtKind::OrSet;

    fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn merge(&self, other: &Self) -> Self {
        ORSet::merge(self, other)
    }

    fn validate(&self) -> CrdtResult<()> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(CrdtError::Invalid(format!("duplicate item id {}", item.id)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_only_affects_observed_items() {
        let a = ORSet::new("node1").add("x");
        // node2 adds "x" concurrently, without seeing node1's add.
        let b = ORSet::new("node2").add("x");
        let a_removed = a.remove(&"x");
        let merged = a_removed.merge(&b);
        assert!(merged.has(&"x"));
        assert_eq!(merged.tombstone_count(), 1);
    }

    #[test]
    fn tombstone_survives_merge_in_both_directions() {
        let base = ORSet::new("node1").add(7);
        let removed = base.remove(&7);
        assert!(!base.merge(&removed).has(&7));
        assert!(!removed.merge(&base).has(&7));
    }

    #[test]
    fn add_with_existing_tag_is_noop() {
        let tag = Tag::new();
        let set = ORSet::new("node1").add_with_tag(1, tag);
        let again = set.add_with_tag(2, tag);
        assert_eq!(again.items().len(), 1);
        assert_eq!(again.version(), set.version());
    }

    #[test]
    fn tombstoned_item_serializes_flag_only_when_set() {
        let set = ORSet::new("node1").add(1).add(2).remove(&1);
        let json = serde_json::to_value(&set).unwrap();
        let items = json["items"].as_array().unwrap();
        assert_eq!(items[0]["tombstone"], serde_json::Value::Bool(true));
        assert!(items[1].get("tombstone").is_none());
    }
}
