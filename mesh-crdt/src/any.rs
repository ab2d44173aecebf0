//! Runtime dispatch over the CRDT kinds.
//!
//! Stored and transmitted snapshots carry a `kind` tag. When the concrete
//! type is not known statically (a generic storage browser, a relay that
//! merges whatever it is handed) decode into [`AnyCrdt`] and merge through
//! it; mixing kinds is reported instead of attempted.

use crate::error::{CrdtError, CrdtResult};
use crate::gset::GSet;
use crate::kind::CrdtKind;
use crate::lww_register::LWWRegister;
use crate::orset::ORSet;
use crate::pn_counter::PNCounter;
use crate::snapshot::{peek_kind, Crdt};
use mesh_types::NodeId;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A decoded snapshot of any kind, with element type `T` for the
/// register and set variants.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyCrdt<T>
where
    T: Ord + Clone,
{
    Register(LWWRegister<T>),
    GSet(GSet<T>),
    ORSet(ORSet<T>),
    Counter(PNCounter),
}

impl<T> AnyCrdt<T>
where
    T: Ord + Clone + Serialize + DeserializeOwned,
{
    /// Decodes a snapshot into the variant named by its `kind` tag.
    pub fn decode(snapshot: &str) -> CrdtResult<Self> {
        Ok(match peek_kind(snapshot)? {
            CrdtKind::LwwRegister => Self::Register(LWWRegister::from_snapshot(snapshot)?),
            CrdtKind::GSet => Self::GSet(GSet::from_snapshot(snapshot)?),
            CrdtKind::OrSet => Self::ORSet(ORSet::from_snapshot(snapshot)?),
            CrdtKind::Counter => Self::Counter(PNCounter::from_snapshot(snapshot)?),
        })
    }

    /// Encodes the wrapped value as a tagged snapshot.
    pub fn encode(&self) -> CrdtResult<String> {
        match self {
            Self::Register(r) => r.to_snapshot(),
            Self::GSet(s) => s.to_snapshot(),
            Self::ORSet(s) => s.to_snapshot(),
            Self::Counter(c) => c.to_snapshot(),
        }
    }

    /// Merges two values of the same kind.
    pub fn merge(&self, other: &Self) -> CrdtResult<Self> {
        match (self, other) {
            (Self::Register(a), Self::Register(b)) => Ok(Self::Register(a.merge(b))),
            (Self::GSet(a), Self::GSet(b)) => Ok(Self::GSet(a.merge(b))),
            (Self::ORSet(a), Self::ORSet(b)) => Ok(Self::ORSet(a.merge(b))),
            (Self::Counter(a), Self::Counter(b)) => Ok(Self::Counter(a.merge(b))),
            (a, b) => Err(CrdtError::KindMismatch {
                expected: a.kind(),
                found: b.kind(),
            }),
        }
    }
}

impl<T> AnyCrdt<T>
where
    T: Ord + Clone,
{
    /// The kind of the wrapped value.
    #[must_use]
    pub fn kind(&self) -> CrdtKind {
        match self {
            Self::Register(_) => CrdtKind::LwwRegister,
            Self::GSet(_) => CrdtKind::GSet,
            Self::ORSet(_) => CrdtKind::OrSet,
            Self::Counter(_) => CrdtKind::Counter,
        }
    }

    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        match self {
            Self::Register(r) => r.node_id(),
            Self::GSet(s) => s.node_id(),
            Self::ORSet(s) => s.node_id(),
            Self::Counter(c) => c.node_id(),
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        match self {
            Self::Register(r) => r.version(),
            Self::GSet(s) => s.version(),
            Self::ORSet(s) => s.version(),
            Self::Counter(c) => c.version(),
        }
    }
}

impl<T: Ord + Clone> From<LWWRegister<T>> for AnyCrdt<T> {
    fn from(r: LWWRegister<T>) -> Self {
        Self::Register(r)
    }
}

impl<T: Ord + Clone> From<GSet<T>> for AnyCrdt<T> {
    fn from(s: GSet<T>) -> Self {
        Self::GSet(s)
    }
}

impl<T: Ord + Clone> From<ORSet<T>> for AnyCrdt<T> {
    fn from(s: ORSet<T>) -> Self {
        Self::ORSet(s)
    }
}

impl<T: Ord + Clone> From<PNCounter> for AnyCrdt<T> {
    fn from(c: PNCounter) -> Self {
        Self::Counter(c)
    }
}
