use mesh_crdt::{Crdt, GSet};
use pretty_assertions::assert_eq;

#[test]
fn new_set_is_empty() {
    let set: GSet<String> = GSet::new("node1");
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);
    assert_eq!(set.version(), 0);
}

#[test]
fn add_and_has() {
    let set = GSet::new("node1").add(1).add(2);
    assert!(set.has(&1));
    assert!(set.has(&2));
    assert!(!set.has(&3));
    assert_eq!(set.version(), 2);
}

#[test]
fn add_is_immutable() {
    let empty = GSet::new("node1");
    let one = empty.add("a");
    assert!(!empty.has(&"a"));
    assert!(one.has(&"a"));
}

#[test]
fn duplicate_add_still_bumps_version() {
    let set = GSet::new("node1").add("a").add("a");
    assert_eq!(set.len(), 1);
    assert_eq!(set.version(), 2);
}

#[test]
fn two_replica_union() {
    let node1 = GSet::new("node1").add("a").add("b");
    let node2 = GSet::new("node2").add("b").add("c");
    let merged = node1.merge(&node2);
    assert_eq!(merged.to_vec(), vec!["a", "b", "c"]);
    assert_eq!(merged.node_id().as_str(), "node1");
}

#[test]
fn merge_version_is_max_plus_one() {
    let a = GSet::new("node1").add(1).add(2).add(3);
    let b = GSet::new("node2").add(4);
    assert_eq!(a.merge(&b).version(), 4);
    assert_eq!(b.merge(&a).version(), 4);
}

#[test]
fn merge_never_shrinks() {
    let big = GSet::from_items("node1", 0..100);
    let small = GSet::from_items("node2", [5, 500]);
    let merged = small.merge(&big);
    assert_eq!(merged.len(), 101);
    for i in 0..100 {
        assert!(merged.has(&i));
    }
}

#[test]
fn from_items_counts_one_version_per_distinct_item() {
    let set = GSet::from_items("node1", ["x", "y", "x"]);
    assert_eq!(set.len(), 2);
    assert_eq!(set.version(), 2);
}

#[test]
fn snapshot_roundtrip() {
    let set = GSet::from_items("node1", ["b".to_string(), "a".to_string()]);
    let snapshot = set.to_snapshot().unwrap();
    let json: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(json["kind"], "g_set");
    assert_eq!(json["items"], serde_json::json!(["a", "b"]));

    let decoded: GSet<String> = GSet::from_snapshot(&snapshot).unwrap();
    assert_eq!(decoded, set);
    assert_eq!(decoded.version(), set.version());
}
