use mesh_crdt::{Crdt, CrdtError, GSet, PNCounter};
use mesh_sync::protocol::{Delta, DeltaRequest, MessageKind, SyncMessage};
use mesh_types::NodeId;
use serde_json::json;

fn sample_delta() -> Delta {
    let set = GSet::new("node1").add("a".to_string()).add("b".to_string());
    Delta::from_state(&set, 0).unwrap()
}

// ── Tags ─────────────────────────────────────────────────────────

#[test]
fn message_kind_wire_names() {
    assert_eq!(MessageKind::DeltaSync.as_str(), "DELTA_SYNC");
    assert_eq!(MessageKind::DeltaRequest.as_str(), "DELTA_REQUEST");
    assert_eq!(MessageKind::DeltaResponse.as_str(), "DELTA_RESPONSE");
    assert_eq!(MessageKind::DeltaSync.to_string(), "DELTA_SYNC");
}

#[test]
fn kind_matches_variant() {
    let delta = sample_delta();
    let request = DeltaRequest::new(3, NodeId::from("node1"));
    assert_eq!(SyncMessage::DeltaSync(delta.clone()).kind(), MessageKind::DeltaSync);
    assert_eq!(SyncMessage::DeltaResponse(delta).kind(), MessageKind::DeltaResponse);
    assert_eq!(SyncMessage::DeltaRequest(request).kind(), MessageKind::DeltaRequest);
}

// ── Delta ────────────────────────────────────────────────────────

#[test]
fn delta_brackets_versions() {
    let set = GSet::new("node1").add(1).add(2).add(3);
    let delta = Delta::from_state(&set, 1).unwrap();
    assert_eq!(delta.from_version, 1);
    assert_eq!(delta.to_version, 3);
    assert_eq!(delta.node_id, NodeId::from("node1"));
}

#[test]
fn delta_carries_full_snapshot() {
    let delta = sample_delta();
    let decoded: GSet<String> = delta.decode().unwrap();
    assert_eq!(decoded.to_vec(), vec!["a", "b"]);
    assert_eq!(decoded.version(), 2);
}

#[test]
fn delta_decode_into_wrong_type_fails() {
    let delta = sample_delta();
    let err = delta.decode::<PNCounter>().unwrap_err();
    assert!(matches!(err, CrdtError::KindMismatch { .. }));
}

#[test]
fn delta_accessor() {
    let delta = sample_delta();
    assert_eq!(SyncMessage::DeltaSync(delta.clone()).delta(), Some(&delta));
    let request = SyncMessage::DeltaRequest(DeltaRequest::new(0, NodeId::from("n")));
    assert!(request.delta().is_none());
}

// ── Wire format ──────────────────────────────────────────────────

#[test]
fn delta_sync_wire_shape() {
    let delta = sample_delta();
    let value: serde_json::Value =
        serde_json::from_str(&SyncMessage::DeltaSync(delta.clone()).to_json().unwrap()).unwrap();
    assert_eq!(value["type"], "DELTA_SYNC");
    assert_eq!(value["payload"]["fromVersion"], 0);
    assert_eq!(value["payload"]["toVersion"], 2);
    assert_eq!(value["payload"]["nodeId"], "node1");
    assert_eq!(value["payload"]["changes"], json!(delta.changes));
}

#[test]
fn delta_request_wire_shape() {
    let msg = SyncMessage::DeltaRequest(DeltaRequest::new(7, NodeId::from("node2")));
    let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({"type": "DELTA_REQUEST", "payload": {"fromVersion": 7, "nodeId": "node2"}})
    );
}

#[test]
fn json_roundtrip() {
    let msg = SyncMessage::DeltaResponse(sample_delta());
    let parsed = SyncMessage::from_json(&msg.to_json().unwrap()).unwrap();
    assert_eq!(parsed, msg);
}

#[test]
fn unknown_tag_is_rejected() {
    let raw = r#"{"type":"HELLO","payload":{}}"#;
    assert!(SyncMessage::from_json(raw).is_err());
}
