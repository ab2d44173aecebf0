//! Snapshot persistence for mesh CRDTs.
//!
//! # Architecture
//!
//! - [`SnapshotStore`] is the key-value contract: save, load, list, delete
//! - [`MemoryStore`] and [`SqliteStore`] implement it
//! - [`CrdtRepository`] converts between typed CRDTs and stored snapshots
//!
//! Snapshots are stored as tagged JSON, so a stored value always records
//! which CRDT type it holds. Merge logic never depends on the store; it is
//! only used to carry state across restarts.

mod error;
mod memory;
mod repository;
mod sqlite;
mod store;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use repository::CrdtRepository;
pub use sqlite::SqliteStore;
pub use store::{SnapshotStore, StoredSnapshot};
