//! Error types for the storage layer.

use mesh_crdt::CrdtError;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored snapshot could not be decoded into the requested CRDT.
    #[error("crdt error: {0}")]
    Crdt(#[from] CrdtError),

    /// Invalid data.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
