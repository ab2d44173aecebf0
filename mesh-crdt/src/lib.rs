//! State-based CRDT value types for the mesh core.
//!
//! This crate provides Conflict-free Replicated Data Types:
//!
//! - [`LWWRegister<T>`] — Last-Writer-Wins Register for single values
//! - [`GSet<T>`] — Grow-only Set
//! - [`ORSet<T>`] — Observed-Remove Set with per-add-event tombstones
//! - [`PNCounter`] — Positive-Negative Counter summed across replicas
//!
//! Every value is an immutable snapshot: mutating operations and merges
//! return a new instance and leave the receiver untouched. Each snapshot
//! carries the owning replica's [`NodeId`](mesh_types::NodeId) and a local
//! `version` counter that grows on every local mutation or merge.
//!
//! All merges in this crate satisfy the following properties (on replicated
//! state; the version counter is local bookkeeping):
//! - **Commutative**: merge(a, b) == merge(b, a)
//! - **Associative**: merge(merge(a, b), c) == merge(a, merge(b, c))
//! - **Idempotent**: merge(a, a) == a
//!
//! Snapshots travel as JSON tagged with a `kind` field. Decoding checks the
//! tag, so a snapshot can never be silently merged into the wrong type; see
//! [`AnyCrdt`] for decoding when the type is only known at runtime.

mod any;
mod error;
mod gset;
mod kind;
mod lww_register;
mod orset;
mod pn_counter;
mod snapshot;

pub use any::AnyCrdt;
pub use error::{CrdtError, CrdtResult};
pub use gset::GSet;
pub use kind::CrdtKind;
pub use lww_register::LWWRegister;
pub use orset::{ORSet, TaggedItem};
pub use pn_counter::PNCounter;
pub use snapshot::{peek_kind, Crdt, KIND_FIELD};
