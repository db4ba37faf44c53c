//! Inbound ports (API) for claim dispatch.

use crate::domain::{Classification, MessageWithPeerMetadata};
use async_trait::async_trait;
use shared_types::{BroadcastMessage, PeerId};

/// The three entry points every dispatch target supplies.
///
/// The dispatcher calls these without knowing which implementation it holds.
/// Calls must not block: long work (signing, submission) is handed off.
///
/// For any one envelope, `raw_message` is called first and exactly once, and
/// at most one of `validated_message` / `mismatch_message` follows.
pub trait BroadcastHandler: Send + Sync {
    /// Observation point for every inbound envelope. Makes no decisions.
    fn raw_message(&self, envelope: &MessageWithPeerMetadata);

    /// The claim agreed with local ground truth.
    fn validated_message(&self, message: BroadcastMessage);

    /// The claim conflicts with local ground truth. Carries the original
    /// envelope so the sender can be identified.
    fn mismatch_message(&self, envelope: MessageWithPeerMetadata);
}

/// Handle for claims arriving from the network.
#[async_trait]
pub trait ClaimReceiver: Send + Sync {
    /// Decode `payload` from `peer` and run it through the dispatch pipeline.
    async fn handle_inbound(&self, peer: PeerId, payload: Vec<u8>) -> Classification;
}
