//! # Relay Events
//!
//! Events that flow through the shared bus between relayer subsystems.
//!
//! | Source | Id | Events |
//! |--------|----|--------|
//! | Runtime / chain watchers | 0 | `LocalStateAdvanced`, `CriticalError` |
//! | rl-01 broadcast | 1 | `ClaimValidated`, `ClaimRejected` |
//! | rl-02 signer | 2 | `MismatchDetected`, `AttestationSubmitted` |

use serde::{Deserialize, Serialize};
use shared_types::{BroadcastMessage, ChainId, ClaimKey, PeerId};

/// Subsystem id of the runtime and its chain watchers.
pub const RUNTIME_SUBSYSTEM: u8 = 0;
/// Subsystem id of the broadcast/dispatch subsystem.
pub const BROADCAST_SUBSYSTEM: u8 = 1;
/// Subsystem id of the signer.
pub const SIGNER_SUBSYSTEM: u8 = 2;

/// All events that can be published to the relay bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelayEvent {
    // =========================================================================
    // LOCAL STATE
    // =========================================================================
    /// The local view of a chain moved forward.
    /// Triggers re-offering of pending claims.
    LocalStateAdvanced {
        chain: ChainId,
        height: u64,
    },

    // =========================================================================
    // DISPATCH (rl-01)
    // =========================================================================
    /// A claim agreed with local ground truth and was handed to the signer.
    ClaimValidated {
        claim_key: ClaimKey,
        peer: Option<PeerId>,
    },

    /// A claim was discarded without reaching the signer.
    ClaimRejected {
        claim_key: ClaimKey,
        peer: Option<PeerId>,
        reason: String,
    },

    // =========================================================================
    // SIGNER (rl-02)
    // =========================================================================
    /// A peer's claim conflicts with local ground truth.
    MismatchDetected {
        claim_key: ClaimKey,
        peer: Option<PeerId>,
        claim: BroadcastMessage,
    },

    /// An attestation for the claim is recorded on the destination chain.
    AttestationSubmitted {
        claim_key: ClaimKey,
        /// True when the chain already held an attestation from this relayer.
        already_satisfied: bool,
    },

    // =========================================================================
    // CRITICAL EVENTS (DLQ)
    // =========================================================================
    /// Critical error requiring operator attention.
    CriticalError {
        subsystem_id: u8,
        error: String,
    },
}

impl RelayEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::LocalStateAdvanced { .. } => EventTopic::LocalState,
            Self::ClaimValidated { .. } | Self::ClaimRejected { .. } => EventTopic::Dispatch,
            Self::MismatchDetected { .. } => EventTopic::Security,
            Self::AttestationSubmitted { .. } => EventTopic::Attestation,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::LocalStateAdvanced { .. } => RUNTIME_SUBSYSTEM,
            Self::ClaimValidated { .. } | Self::ClaimRejected { .. } => BROADCAST_SUBSYSTEM,
            Self::MismatchDetected { .. } | Self::AttestationSubmitted { .. } => SIGNER_SUBSYSTEM,
            Self::CriticalError { subsystem_id, .. } => *subsystem_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Local chain progress.
    LocalState,
    /// Dispatcher outcomes.
    Dispatch,
    /// Mismatches and other security signals.
    Security,
    /// Attestation submissions.
    Attestation,
    /// Dead Letter Queue for critical errors.
    DeadLetterQueue,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &RelayEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
