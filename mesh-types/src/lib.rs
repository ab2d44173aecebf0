//! Core type definitions for the mesh CRDT core.
//!
//! This crate defines the small, dependency-light types shared by every
//! replica:
//! - Replica identifiers ([`NodeId`])
//! - Per-add-event identifiers for observed-remove sets ([`Tag`])
//! - Wall-clock timestamps used by last-writer-wins resolution ([`Timestamp`])

mod ids;
mod timestamp;

pub use ids::{NodeId, Tag};
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid tag: {0}")]
    InvalidTag(#[from] uuid::Error),

    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
