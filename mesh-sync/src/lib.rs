//! Delta-exchange sync for mesh CRDTs.
//!
//! # Architecture
//!
//! Replicas converge by exchanging CRDT snapshots and merging them. Because
//! every merge is commutative, associative and idempotent, deltas can arrive
//! in any order, any number of times.
//!
//! ## Components
//!
//! - **Protocol**: the tagged messages exchanged between peers
//! - **Transport**: abstracts a connection to one peer
//! - **Delta sync**: drives one request/response exchange per call
//!
//! ## Sync Process
//!
//! 1. **Push**: serialize local state into a delta tagged with a version range
//! 2. **Exchange**: send it and wait for exactly one reply
//! 3. **Apply**: decode the reply and merge it into local state
//!
//! # Example
//!
//! ```no_run
//! use mesh_crdt::GSet;
//! use mesh_sync::{DeltaSync, MemoryTransport, SyncResult};
//! use std::sync::Arc;
//!
//! # async fn run() -> SyncResult<()> {
//! let (left, right) = MemoryTransport::pair();
//! let node1 = GSet::new("node1").add("a".to_string());
//! let node2 = GSet::new("node2").add("b".to_string());
//! let mut node1 = DeltaSync::new(node1, Arc::new(left));
//! let mut node2 = DeltaSync::new(node2, Arc::new(right));
//!
//! // node1 pushes its state; node2 merges it and answers with its own.
//! let (merged, handled) = tokio::join!(node1.sync(), node2.respond());
//! handled?;
//! assert_eq!(merged?.to_vec(), vec!["a", "b"]);
//! # Ok(())
//! # }
//! ```

mod config;
mod delta;
mod error;
pub mod protocol;
pub mod transport;

pub use config::{SyncConfig, DEFAULT_MAX_DELTA_BYTES};
pub use delta::{DeltaSync, SyncPhase};
pub use error::{SyncError, SyncResult};
pub use protocol::{Delta, DeltaRequest, MessageKind, SyncMessage};
pub use transport::memory::MemoryTransport;
pub use transport::{ConnectionCallback, Transport};
