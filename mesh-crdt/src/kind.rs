use crate::error::CrdtError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminator written into every serialized snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrdtKind {
    LwwRegister,
    GSet,
    OrSet,
    Counter,
}

impl CrdtKind {
    /// All kinds, in declaration order.
    pub const ALL: [CrdtKind; 4] = [
        CrdtKind::LwwRegister,
        CrdtKind::GSet,
        CrdtKind::OrSet,
        CrdtKind::Counter,
    ];

    /// The wire name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CrdtKind::LwwRegister => "lww_register",
            CrdtKind::GSet => "g_set",
            CrdtKind::OrSet => "or_set",
            CrdtKind::Counter => "counter",
        }
    }
}

impl fmt::Display for CrdtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrdtKind {
    type Err = CrdtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CrdtError::UnknownKind(s.to_string()))
    }
}
