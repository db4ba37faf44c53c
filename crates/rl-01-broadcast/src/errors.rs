//! Error types for the broadcast subsystem.

use shared_types::PeerId;
use thiserror::Error;

/// Outbound transport failures, reported per target peer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("peer {0} is not connected")]
    PeerUnreachable(PeerId),

    #[error("peer {0} outbound queue is full")]
    Backpressure(PeerId),

    #[error("transport closed")]
    Closed,
}

/// Failures of a whole broadcast call.
///
/// Per-peer transport failures are not errors here; they are listed in the
/// returned report.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("failed to encode claim: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Chain-state reader failures.
///
/// Treated as temporary unavailability of ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderError {
    #[error("chain state unavailable: {0}")]
    Unavailable(String),
}
