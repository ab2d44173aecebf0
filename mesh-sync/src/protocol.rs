//! Sync protocol messages and types.
//!
//! The protocol is a single request/response exchange per call:
//! 1. `DELTA_SYNC` — push our state and expect the peer's state back
//! 2. `DELTA_REQUEST` — ask the peer for its state above a version floor
//! 3. `DELTA_RESPONSE` — the answer to a `DELTA_REQUEST`
//!
//! Every delta currently carries a full-state snapshot; `fromVersion` and
//! `toVersion` only bracket it. Since merge is idempotent, resending state
//! the peer already has is harmless.

use mesh_crdt::{Crdt, CrdtResult};
use mesh_types::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminating tag of a [`SyncMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    DeltaSync,
    DeltaRequest,
    DeltaResponse,
}

impl MessageKind {
    /// The wire name of this tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageKind::DeltaSync => "DELTA_SYNC",
            MessageKind::DeltaRequest => "DELTA_REQUEST",
            MessageKind::DeltaResponse => "DELTA_RESPONSE",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sync protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncMessage {
    /// Our state, pushed as part of a symmetric exchange.
    DeltaSync(Delta),

    /// Request for the peer's state above a version floor.
    DeltaRequest(DeltaRequest),

    /// Answer to a [`SyncMessage::DeltaRequest`].
    DeltaResponse(Delta),
}

impl SyncMessage {
    /// Returns the message's tag.
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            SyncMessage::DeltaSync(_) => MessageKind::DeltaSync,
            SyncMessage::DeltaRequest(_) => MessageKind::DeltaRequest,
            SyncMessage::DeltaResponse(_) => MessageKind::DeltaResponse,
        }
    }

    /// Returns the carried delta, if this message has one.
    #[must_use]
    pub fn delta(&self) -> Option<&Delta> {
        match self {
            SyncMessage::DeltaSync(d) | SyncMessage::DeltaResponse(d) => Some(d),
            SyncMessage::DeltaRequest(_) => None,
        }
    }

    /// Encodes the message as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decodes a message from JSON.
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

/// The state carried between replicas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    /// Version floor the sender believes the receiver already has.
    pub from_version: u64,
    /// The sender's version at the time of sending.
    pub to_version: u64,
    /// Serialized CRDT snapshot.
    pub changes: String,
    /// Sending replica.
    pub node_id: NodeId,
}

impl Delta {
    /// Builds a full-state delta from `crdt`, bracketed from `from_version`.
    pub fn from_state<C: Crdt>(crdt: &C, from_version: u64) -> CrdtResult<Self> {
        Ok(Self {
            from_version,
            to_version: crdt.version(),
            changes: crdt.to_snapshot()?,
            node_id: crdt.node_id().clone(),
        })
    }

    /// Decodes the carried snapshot into `C`.
    pub fn decode<C: Crdt>(&self) -> CrdtResult<C> {
        C::from_snapshot(&self.changes)
    }
}

/// Request for a peer's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaRequest {
    /// Versions at or below this floor are already known to the requester.
    pub from_version: u64,
    /// Requesting replica.
    pub node_id: NodeId,
}

impl DeltaRequest {
    /// Creates a new request.
    pub fn new(from_version: u64, node_id: NodeId) -> Self {
        Self {
            from_version,
            node_id,
        }
    }
}
