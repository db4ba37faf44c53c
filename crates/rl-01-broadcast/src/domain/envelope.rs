//! Message envelope: a claim plus its delivery provenance.

use shared_types::{BroadcastMessage, ClaimKey, PeerId};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A claim together with who sent it and how long it stays actionable.
///
/// Created once at the transport boundary (inbound) or at claim origination
/// (local) and never mutated. Re-delivery of the same claim produces a new
/// envelope with a new `receipt_id`.
#[derive(Clone, Debug)]
pub struct MessageWithPeerMetadata {
    message: BroadcastMessage,
    peer_id: Option<PeerId>,
    deadline: Instant,
    received_at: Instant,
    receipt_id: Uuid,
}

impl MessageWithPeerMetadata {
    /// Envelope for a claim delivered by `peer`.
    pub fn inbound(message: BroadcastMessage, peer: PeerId, deadline: Instant) -> Self {
        Self::build(message, Some(peer), deadline)
    }

    /// Envelope for a claim this node originated.
    pub fn local(message: BroadcastMessage, deadline: Instant) -> Self {
        Self::build(message, None, deadline)
    }

    fn build(message: BroadcastMessage, peer_id: Option<PeerId>, deadline: Instant) -> Self {
        Self {
            message,
            peer_id,
            deadline,
            received_at: Instant::now(),
            receipt_id: Uuid::new_v4(),
        }
    }

    pub fn message(&self) -> &BroadcastMessage {
        &self.message
    }

    pub fn into_message(self) -> BroadcastMessage {
        self.message
    }

    /// Sending peer. `None` for self-originated claims.
    pub fn peer_id(&self) -> Option<&PeerId> {
        self.peer_id.as_ref()
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn received_at(&self) -> Instant {
        self.received_at
    }

    pub fn receipt_id(&self) -> Uuid {
        self.receipt_id
    }

    pub fn key(&self) -> ClaimKey {
        self.message.key()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// Tolerated lead of a sender's clock over ours when checking `created`.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Deadline for a claim received at `now`.
///
/// The earlier of the local pending TTL and the sender-declared expiry. A
/// claim whose declared expiry has already passed gets `now`, so it is
/// expired on arrival. A deadline past what `Instant` can represent also
/// collapses to `now`.
pub fn deadline_for(
    message: &BroadcastMessage,
    default_ttl: Duration,
    now: Instant,
    unix_now: u64,
) -> Instant {
    let remaining = match message.expires_at() {
        Some(expires_at) => Duration::from_secs(expires_at.saturating_sub(unix_now)).min(default_ttl),
        None => return now,
    };
    now.checked_add(remaining).unwrap_or(now)
}
