//! Transport layer abstraction.
//!
//! The protocol only needs a connected, ordered, message-at-a-time channel to
//! one peer. Framing, addressing and reconnection are the transport's
//! business.

use crate::error::SyncResult;
use crate::protocol::SyncMessage;
use async_trait::async_trait;

/// Callback fired on connection state changes.
pub type ConnectionCallback = Box<dyn Fn() + Send + Sync>;

/// A connection to a single peer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns whether the connection is currently up.
    fn is_connected(&self) -> bool;

    /// Sends one message to the peer.
    async fn send(&self, message: SyncMessage) -> SyncResult<()>;

    /// Waits for the next message from the peer.
    async fn receive(&self) -> SyncResult<SyncMessage>;

    /// Registers a callback fired when the connection comes up.
    fn on_connect(&self, callback: ConnectionCallback);

    /// Registers a callback fired when the connection goes down.
    fn on_disconnect(&self, callback: ConnectionCallback);
}

/// An in-process transport for tests and single-process meshes.
pub mod memory {
    use super::*;
    use crate::error::SyncError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, PoisonError};
    use tokio::sync::mpsc;

    /// One end of an in-memory link.
    ///
    /// Messages sent on one end arrive, in order, on the other. Each end has
    /// its own connection flag so tests can take either side down.
    pub struct MemoryTransport {
        outbound: mpsc::UnboundedSender<SyncMessage>,
        loopback: mpsc::UnboundedSender<SyncMessage>,
        inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<SyncMessage>>,
        connected: AtomicBool,
        sent: AtomicUsize,
        on_connect: Mutex<Vec<ConnectionCallback>>,
        on_disconnect: Mutex<Vec<ConnectionCallback>>,
    }

    impl std::fmt::Debug for MemoryTransport {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MemoryTransport")
                .field("connected", &self.connected.load(Ordering::SeqCst))
                .field("sent", &self.sent.load(Ordering::SeqCst))
                .finish()
        }
    }

    impl MemoryTransport {
        /// Creates two connected ends of one link.
        pub fn pair() -> (Self, Self) {
            let (tx_a, rx_a) = mpsc::unbounded_channel();
            let (tx_b, rx_b) = mpsc::unbounded_channel();
            let a = Self::new(tx_b.clone(), tx_a.clone(), rx_a);
            let b = Self::new(tx_a, tx_b, rx_b);
            (a, b)
        }

        fn new(
            outbound: mpsc::UnboundedSender<SyncMessage>,
            loopback: mpsc::UnboundedSender<SyncMessage>,
            inbound: mpsc::UnboundedReceiver<SyncMessage>,
        ) -> Self {
            Self {
                outbound,
                loopback,
                inbound: tokio::sync::Mutex::new(inbound),
                connected: AtomicBool::new(true),
                sent: AtomicUsize::new(0),
                on_connect: Mutex::new(Vec::new()),
                on_disconnect: Mutex::new(Vec::new()),
            }
        }

        /// Marks this end connected, firing `on_connect` callbacks on change.
        pub fn connect(&self) {
            if !self.connected.swap(true, Ordering::SeqCst) {
                fire(&self.on_connect);
            }
        }

        /// Marks this end disconnected, firing `on_disconnect` callbacks on change.
        pub fn disconnect(&self) {
            if self.connected.swap(false, Ordering::SeqCst) {
                fire(&self.on_disconnect);
            }
        }

        /// Queues a message as if the peer had sent it.
        pub fn inject(&self, message: SyncMessage) -> SyncResult<()> {
            self.loopback
                .send(message)
                .map_err(|_| SyncError::ChannelClosed)
        }

        /// Number of messages sent from this end.
        pub fn sent_count(&self) -> usize {
            self.sent.load(Ordering::SeqCst)
        }
    }

    fn fire(callbacks: &Mutex<Vec<ConnectionCallback>>) {
        let callbacks = callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        for callback in callbacks.iter() {
            callback();
        }
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn send(&self, message: SyncMessage) -> SyncResult<()> {
            if !self.is_connected() {
                return Err(SyncError::Network("not connected".into()));
            }
            self.outbound
                .send(message)
                .map_err(|_| SyncError::ChannelClosed)?;
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn receive(&self) -> SyncResult<SyncMessage> {
            let mut inbound = self.inbound.lock().await;
            inbound.recv().await.ok_or(SyncError::ChannelClosed)
        }

        fn on_connect(&self, callback: ConnectionCallback) {
            self.on_connect
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(callback);
        }

        fn on_disconnect(&self, callback: ConnectionCallback) {
            self.on_disconnect
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(callback);
        }
    }
}
