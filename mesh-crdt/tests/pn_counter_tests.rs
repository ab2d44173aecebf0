use mesh_crdt::{Crdt, PNCounter};
use mesh_types::NodeId;

#[test]
fn two_replicas_increment_then_merge() {
    let a = PNCounter::new("A").increment(5);
    let b = PNCounter::new("B").increment(5);
    assert_eq!(a.merge(&b).value(), 10);
    assert_eq!(b.merge(&a).value(), 10);
}

#[test]
fn increment_is_immutable() {
    let c = PNCounter::new("node1");
    let d = c.increment(3);
    assert_eq!(c.value(), 0);
    assert_eq!(d.value(), 3);
    assert_eq!(d.version(), 1);
}

#[test]
fn decrement_converges_across_replicas() {
    let a = PNCounter::new("A").increment(10);
    let b = PNCounter::new("B").merge(&a);

    let a = a.decrement(3);
    let b = b.increment(2).decrement(1);

    let ab = a.merge(&b);
    let ba = b.merge(&a);
    assert_eq!(ab, ba);
    assert_eq!(ab.value(), 10 - 3 + 2 - 1);
}

#[test]
fn repeated_merge_is_stable() {
    let a = PNCounter::new("A").increment(4).decrement(1);
    let b = PNCounter::new("B").increment(6);
    let once = a.merge(&b);
    let twice = once.merge(&b).merge(&b);
    assert_eq!(once, twice);
    assert_eq!(twice.value(), 9);
    assert!(twice.version() > once.version());
}

#[test]
fn merge_keeps_owner() {
    let a = PNCounter::new("A");
    let b = PNCounter::new("B").increment(1);
    assert_eq!(a.merge(&b).node_id(), &NodeId::from("A"));
}

#[test]
fn three_replica_convergence() {
    let a = PNCounter::new("A").increment(10);
    let b = PNCounter::new("B").increment(20).decrement(5);
    let c = PNCounter::new("C").decrement(3);

    let a2 = a.merge(&b).merge(&c);
    let b2 = b.merge(&c).merge(&a);
    let c2 = c.merge(&a).merge(&b);

    assert_eq!(a2, b2);
    assert_eq!(b2, c2);
    assert_eq!(a2.value(), 22);
}

#[test]
fn snapshot_carries_both_maps() {
    let c = PNCounter::new("A").increment(7).decrement(2);
    let snapshot = c.to_snapshot().unwrap();
    let json: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(json["kind"], "counter");
    assert_eq!(json["increments"]["A"], 7);
    assert_eq!(json["decrements"]["A"], 2);

    let decoded = PNCounter::from_snapshot(&snapshot).unwrap();
    assert_eq!(decoded, c);
    assert_eq!(decoded.value(), 5);
}

#[test]
fn negative_slot_is_malformed() {
    let snapshot =
        r#"{"kind":"counter","increments":{"A":-1},"decrements":{},"nodeId":"A","version":1}"#;
    assert!(PNCounter::from_snapshot(snapshot).is_err());
}
