//! Error types for the sync layer.

use crate::protocol::MessageKind;
use mesh_crdt::CrdtError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
///
/// None of these are retried inside the protocol; retry and backoff belong
/// to the caller.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The transport reported itself disconnected before any I/O.
    #[error("transport disconnected")]
    TransportDisconnected,

    /// A message of the wrong kind arrived for the current sync step.
    #[error("protocol mismatch: expected {expected}, got {found}")]
    ProtocolMismatch {
        expected: MessageKind,
        found: MessageKind,
    },

    /// The peer's snapshot could not be decoded into the local CRDT type.
    #[error("crdt error: {0}")]
    Crdt(#[from] CrdtError),

    /// Serialization error on the wire envelope.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A delta exceeded the configured size limit.
    #[error("delta too large: {size} bytes (limit {limit})")]
    DeltaTooLarge { size: usize, limit: usize },

    /// Network error reported by the transport.
    #[error("network error: {0}")]
    Network(String),

    /// The transport's channel was closed by the other side.
    #[error("channel closed")]
    ChannelClosed,

    /// A configured receive timeout elapsed.
    #[error("operation timed out")]
    Timeout,
}
