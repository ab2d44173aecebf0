//! Delta-based sync between two replicas.
//!
//! A [`DeltaSync`] owns one replica's current CRDT snapshot and a transport
//! to one peer. Each operation performs exactly one exchange; failures are
//! returned to the caller and never retried here. Local state only changes
//! once an exchange has completed, including any reply we owe the peer, so
//! a failed call leaves it untouched.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::protocol::{Delta, DeltaRequest, MessageKind, SyncMessage};
use crate::transport::Transport;
use mesh_crdt::Crdt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a session is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// No exchange in flight.
    #[default]
    Idle,
    /// A message has been sent and the peer's delta is awaited.
    AwaitingPeerDelta,
}

/// Delta-exchange session for one local CRDT and one peer.
pub struct DeltaSync<C, T: ?Sized> {
    local: C,
    transport: Arc<T>,
    config: SyncConfig,
    last_sync_version: u64,
    phase: SyncPhase,
}

impl<C, T> DeltaSync<C, T>
where
    C: Crdt,
    T: Transport + ?Sized,
{
    /// Creates a session with the default configuration.
    pub fn new(local: C, transport: Arc<T>) -> Self {
        Self::with_config(local, transport, SyncConfig::default())
    }

    /// Creates a session with a custom configuration.
    pub fn with_config(local: C, transport: Arc<T>, config: SyncConfig) -> Self {
        Self {
            local,
            transport,
            config,
            last_sync_version: 0,
            phase: SyncPhase::Idle,
        }
    }

    /// The current local snapshot.
    pub fn local(&self) -> &C {
        &self.local
    }

    /// Consumes the session, returning the local snapshot.
    pub fn into_local(self) -> C {
        self.local
    }

    /// Applies a local mutation, e.g. `session.update(|s| s.add("x"))`.
    pub fn update(&mut self, mutate: impl FnOnce(&C) -> C) -> &C {
        self.local = mutate(&self.local);
        &self.local
    }

    /// The peer version recorded by the last successful exchange.
    pub fn last_sync_version(&self) -> u64 {
        self.last_sync_version
    }

    /// The session's current phase.
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// The session's configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    // ── Initiator side ───────────────────────────────────────────

    /// Pushes our state and merges the peer's state from its reply.
    ///
    /// Fails with [`SyncError::TransportDisconnected`] before any I/O if the
    /// transport is down, and with [`SyncError::ProtocolMismatch`] if the
    /// reply is not a `DELTA_SYNC`.
    pub async fn sync(&mut self) -> SyncResult<C> {
        self.ensure_connected()?;
        let delta = self.outbound_delta(self.last_sync_version)?;
        debug!(
            "Sending DELTA_SYNC from {} (versions {}..{})",
            delta.node_id, delta.from_version, delta.to_version
        );
        self.transport.send(SyncMessage::DeltaSync(delta)).await?;

        let reply = self.await_delta(MessageKind::DeltaSync).await?;
        let merged = self.absorb(&reply)?;
        Ok(self.commit(merged, &reply))
    }

    /// Asks the peer for its state above `from_version`.
    ///
    /// The answer is collected with [`DeltaSync::receive_delta`].
    pub async fn request_delta(&mut self, from_version: u64) -> SyncResult<()> {
        self.ensure_connected()?;
        let request = DeltaRequest::new(from_version, self.local.node_id().clone());
        debug!("Sending DELTA_REQUEST from version {}", from_version);
        self.transport
            .send(SyncMessage::DeltaRequest(request))
            .await?;
        self.phase = SyncPhase::AwaitingPeerDelta;
        Ok(())
    }

    /// Waits for one `DELTA_RESPONSE` and merges it.
    pub async fn receive_delta(&mut self) -> SyncResult<C> {
        self.ensure_connected()?;
        let delta = self.await_delta(MessageKind::DeltaResponse).await?;
        let merged = self.absorb(&delta)?;
        Ok(self.commit(merged, &delta))
    }

    // ── Responder side ───────────────────────────────────────────

    /// Waits for one inbound message and answers it.
    ///
    /// A `DELTA_SYNC` is merged and answered with our merged state; a
    /// `DELTA_REQUEST` is answered with a `DELTA_RESPONSE`. An unsolicited
    /// `DELTA_RESPONSE` is a protocol mismatch. Returns the kind handled.
    pub async fn respond(&mut self) -> SyncResult<MessageKind> {
        self.ensure_connected()?;
        let message = self.receive_message().await?;
        let kind = message.kind();
        match message {
            SyncMessage::DeltaSync(delta) => {
                // Nothing is committed until the reply has gone out.
                let merged = self.absorb(&delta)?;
                let reply = Delta::from_state(&merged, delta.to_version)?;
                self.check_size(&reply)?;
                debug!("Answering DELTA_SYNC with version {}", reply.to_version);
                self.transport.send(SyncMessage::DeltaSync(reply)).await?;
                self.commit(merged, &delta);
            }
            SyncMessage::DeltaRequest(request) => {
                let reply = self.outbound_delta(request.from_version)?;
                debug!(
                    "Answering DELTA_REQUEST from {} with version {}",
                    request.node_id, reply.to_version
                );
                self.transport
                    .send(SyncMessage::DeltaResponse(reply))
                    .await?;
            }
            SyncMessage::DeltaResponse(_) => {
                warn!("Received unsolicited DELTA_RESPONSE");
                return Err(SyncError::ProtocolMismatch {
                    expected: MessageKind::DeltaRequest,
                    found: kind,
                });
            }
        }
        Ok(kind)
    }

    // ── Internals ────────────────────────────────────────────────

    fn ensure_connected(&self) -> SyncResult<()> {
        if self.transport.is_connected() {
            Ok(())
        } else {
            warn!("Sync attempted on disconnected transport");
            Err(SyncError::TransportDisconnected)
        }
    }

    fn outbound_delta(&self, from_version: u64) -> SyncResult<Delta> {
        let delta = Delta::from_state(&self.local, from_version)?;
        self.check_size(&delta)?;
        Ok(delta)
    }

    fn check_size(&self, delta: &Delta) -> SyncResult<()> {
        let size = delta.changes.len();
        let limit = self.config.max_delta_bytes;
        if size > limit {
            warn!("Delta of {} bytes exceeds limit of {}", size, limit);
            return Err(SyncError::DeltaTooLarge { size, limit });
        }
        Ok(())
    }

    async fn receive_message(&self) -> SyncResult<SyncMessage> {
        match self.config.receive_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.transport.receive())
                .await
                .map_err(|_| SyncError::Timeout)?,
            None => self.transport.receive().await,
        }
    }

    /// Waits for exactly one message and checks its tag.
    async fn await_delta(&mut self, expected: MessageKind) -> SyncResult<Delta> {
        self.phase = SyncPhase::AwaitingPeerDelta;
        let received = self.receive_message().await;
        self.phase = SyncPhase::Idle;

        let message = received?;
        let found = message.kind();
        if found != expected {
            warn!("Expected {} but received {}", expected, found);
            return Err(SyncError::ProtocolMismatch { expected, found });
        }
        match message {
            SyncMessage::DeltaSync(delta) | SyncMessage::DeltaResponse(delta) => Ok(delta),
            SyncMessage::DeltaRequest(_) => Err(SyncError::ProtocolMismatch { expected, found }),
        }
    }

    /// Decodes a peer delta and merges it with local state without storing
    /// the result.
    fn absorb(&self, delta: &Delta) -> SyncResult<C> {
        self.check_size(delta)?;
        let remote: C = delta.decode()?;
        Ok(self.local.merge(&remote))
    }

    /// Replaces local state with `merged` and records the peer's version.
    fn commit(&mut self, merged: C, delta: &Delta) -> C {
        info!(
            "Merged delta from {} (peer version {}), local version now {}",
            delta.node_id,
            delta.to_version,
            merged.version()
        );
        self.local = merged.clone();
        self.last_sync_version = delta.to_version;
        merged
    }
}
