//! Outbound ports (SPI) for claim dispatch.

use crate::errors::{ReaderError, TransportError};
use async_trait::async_trait;
use shared_types::{BroadcastMessage, ClaimPayload, PeerId};

/// Peer transport used by the broadcaster.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// This node's identity on the gossip network.
    fn local_peer_id(&self) -> PeerId;

    /// Peers currently reachable.
    fn connected_peers(&self) -> Vec<PeerId>;

    /// Deliver `payload` to one peer. May wait on back-pressure.
    async fn send(&self, peer: &PeerId, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// What local ground truth says about a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The local view has not reached the claimed event yet.
    NotYetKnown,
    /// The event as this node derives it. Compared against the claim.
    Known(ClaimPayload),
    /// The local view covers the claimed height and the event is absent.
    NotFound,
}

/// Independent re-derivation of claims from local chain state.
///
/// What counts as "available" (height lag, confirmations, oracle samples) is
/// up to the implementation.
#[async_trait]
pub trait ChainStateReader: Send + Sync {
    async fn observe(&self, message: &BroadcastMessage) -> Result<Observation, ReaderError>;
}
