//! Signer configuration and alert values.

use shared_types::{BroadcastMessage, ClaimKey, PeerId};
use std::time::Duration;
use uuid::Uuid;

/// Submission tuning.
#[derive(Clone, Debug)]
pub struct SignerConfig {
    /// Capacity of the validated-claim queue between handler and workers.
    pub queue_capacity: usize,
    /// Retries after the first failed submission attempt.
    pub max_submit_retries: u32,
    /// Backoff before the first retry; doubles per retry.
    pub submit_backoff: Duration,
    /// Ceiling for a single backoff sleep.
    pub max_backoff: Duration,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_submit_retries: 5,
            submit_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl SignerConfig {
    /// Sleep before retry number `retry` (0-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.submit_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }
}

/// A peer claim that conflicts with local ground truth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MismatchAlert {
    pub claim_key: ClaimKey,
    /// `None` for claims this node produced itself.
    pub peer: Option<PeerId>,
    pub receipt_id: Uuid,
    pub claim: BroadcastMessage,
}

/// Final result of one pass through the submission worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttestationOutcome {
    /// A new attestation was accepted on-chain.
    Submitted,
    /// The chain already had it; nothing changed.
    AlreadySatisfied,
    /// Already attested before signing; nothing submitted.
    Skipped,
    Failed(String),
}

impl AttestationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::AlreadySatisfied => "already_satisfied",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}
