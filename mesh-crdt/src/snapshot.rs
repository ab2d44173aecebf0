//! The common CRDT interface and its tagged JSON snapshot format.

use crate::error::{CrdtError, CrdtResult};
use crate::kind::CrdtKind;
use mesh_types::NodeId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Name of the discriminator field added to every snapshot.
pub const KIND_FIELD: &str = "kind";

/// A state-based CRDT value.
///
/// Implementors are immutable snapshots: `merge` returns the least upper
/// bound of both states as a new value.
pub trait Crdt: Clone + Serialize + DeserializeOwned {
    /// Tag written into serialized snapshots of this type.
    const KIND: CrdtKind;

    /// The replica that owns this snapshot.
    fn node_id(&self) -> &NodeId;

    /// Local logical version; never decreases.
    fn version(&self) -> u64;

    /// Merges a peer's state into a new snapshot.
    #[must_use]
    fn merge(&self, other: &Self) -> Self;

    /// Checks type-specific invariants after decoding.
    fn validate(&self) -> CrdtResult<()> {
        Ok(())
    }

    /// Serializes the full state, tagged with [`Self::KIND`].
    fn to_snapshot(&self) -> CrdtResult<String> {
        let mut value = serde_json::to_value(self)?;
        let object = value.as_object_mut().ok_or(CrdtError::NotAnObject)?;
        object.insert(KIND_FIELD.to_string(), serde_json::to_value(Self::KIND)?);
        Ok(serde_json::to_string(&value)?)
    }

    /// Decodes a snapshot produced by [`Crdt::to_snapshot`].
    ///
    /// Fails if the snapshot is malformed, carries another kind, or breaks
    /// an invariant of this type.
    fn from_snapshot(snapshot: &str) -> CrdtResult<Self> {
        let value: Value = serde_json::from_str(snapshot)?;
        let found = kind_of(&value)?;
        if found != Self::KIND {
            return Err(CrdtError::KindMismatch {
                expected: Self::KIND,
                found,
            });
        }
        let decoded: Self = serde_json::from_value(value)?;
        decoded.validate()?;
        Ok(decoded)
    }
}

/// Reads only the `kind` tag of a snapshot.
pub fn peek_kind(snapshot: &str) -> CrdtResult<CrdtKind> {
    let value: Value = serde_json::from_str(snapshot)?;
    kind_of(&value)
}

fn kind_of(value: &Value) -> CrdtResult<CrdtKind> {
    let object = value.as_object().ok_or(CrdtError::NotAnObject)?;
    object
        .get(KIND_FIELD)
        .and_then(Value::as_str)
        .ok_or(CrdtError::MissingKind)?
        .parse()
}
