//! Configuration for the sync protocol.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default cap on a single delta's serialized size (16 MB).
pub const DEFAULT_MAX_DELTA_BYTES: usize = 16 * 1024 * 1024;

/// Configuration for a [`DeltaSync`](crate::DeltaSync) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Largest `changes` payload accepted or sent, in bytes.
    pub max_delta_bytes: usize,
    /// How long to wait for a peer's reply. `None` waits indefinitely;
    /// callers that need a bound can also wrap the call themselves.
    pub receive_timeout_ms: Option<u64>,
}

impl SyncConfig {
    /// The receive timeout as a [`Duration`].
    pub fn receive_timeout(&self) -> Option<Duration> {
        self.receive_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_delta_bytes: DEFAULT_MAX_DELTA_BYTES,
            receive_timeout_ms: None,
        }
    }
}
