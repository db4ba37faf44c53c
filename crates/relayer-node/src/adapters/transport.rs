//! # Loopback Transport
//!
//! In-process gossip network for devnet runs and integration tests. Each
//! relayer joins with its peer id and gets a [`ChannelTransport`] for
//! sending plus a receiver for its inbound `(sender, bytes)` frames.
//! Sends wait when the target's inbound queue is full.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use rl_01_broadcast::{PeerTransport, TransportError};
use shared_types::PeerId;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// One inbound frame: sender and raw payload.
pub type InboundFrame = (PeerId, Vec<u8>);

type Mailboxes = Arc<RwLock<HashMap<PeerId, mpsc::Sender<InboundFrame>>>>;

/// Shared registry of every joined peer's inbound queue.
#[derive(Clone, Default)]
pub struct LoopbackNetwork {
    mailboxes: Mailboxes,
}

impl LoopbackNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `peer` and return its transport and inbound queue.
    ///
    /// Joining again with the same id replaces the previous mailbox.
    pub fn join(&self, peer: PeerId, capacity: usize) -> (ChannelTransport, mpsc::Receiver<InboundFrame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.mailboxes.write().insert(peer, tx);
        debug!(peer_id = %peer, "Peer joined loopback network");
        (
            ChannelTransport {
                local: peer,
                mailboxes: self.mailboxes.clone(),
            },
            rx,
        )
    }

    /// Drop `peer`'s mailbox; later sends to it fail.
    pub fn leave(&self, peer: &PeerId) {
        self.mailboxes.write().remove(peer);
    }

    pub fn peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self.mailboxes.read().keys().copied().collect();
        peers.sort();
        peers
    }
}

/// [`PeerTransport`] over a [`LoopbackNetwork`].
#[derive(Clone)]
pub struct ChannelTransport {
    local: PeerId,
    mailboxes: Mailboxes,
}

#[async_trait]
impl PeerTransport for ChannelTransport {
    fn local_peer_id(&self) -> PeerId {
        self.local
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self
            .mailboxes
            .read()
            .keys()
            .filter(|peer| **peer != self.local)
            .copied()
            .collect();
        peers.sort();
        peers
    }

    async fn send(&self, peer: &PeerId, payload: Vec<u8>) -> Result<(), TransportError> {
        let mailbox = self
            .mailboxes
            .read()
            .get(peer)
            .cloned()
            .ok_or(TransportError::PeerUnreachable(*peer))?;

        trace!(peer_id = %peer, bytes = payload.len(), "Loopback send");
        mailbox
            .send((self.local, payload))
            .await
            .map_err(|_| TransportError::PeerUnreachable(*peer))
    }
}
