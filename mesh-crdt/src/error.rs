//! Error types for snapshot decoding.

use crate::kind::CrdtKind;
use thiserror::Error;

/// Result type for CRDT snapshot operations.
pub type CrdtResult<T> = Result<T, CrdtError>;

/// Errors that can occur while encoding or decoding CRDT snapshots.
///
/// Local mutations and merges never fail; only the boundary to serialized
/// state does.
#[derive(Debug, Error)]
pub enum CrdtError {
    /// The snapshot is not valid JSON or does not match the type's shape.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The snapshot is valid JSON but not an object.
    #[error("snapshot is not a JSON object")]
    NotAnObject,

    /// The snapshot carries no `kind` tag.
    #[error("snapshot has no kind tag")]
    MissingKind,

    /// The `kind` tag names no known CRDT.
    #[error("unknown snapshot kind: {0}")]
    UnknownKind(String),

    /// The snapshot holds a different CRDT than the caller asked for.
    #[error("kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: CrdtKind, found: CrdtKind },

    /// The snapshot decoded but violates an invariant of its type.
    #[error("invalid snapshot state: {0}")]
    Invalid(String),
}
