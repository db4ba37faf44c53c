//! Adjudication outcomes. Derived per pass, never stored.

use shared_types::ValidationError;
use std::fmt;

/// Why a claim was discarded without reaching the signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Payload bytes did not decode into a claim.
    Undecodable(String),
    /// Claim failed `validate_basic`.
    Structural(ValidationError),
    /// Deadline elapsed before ground truth became available.
    Stale,
    /// Dropped to make room in a full pending store.
    Evicted,
    /// Re-offered too many times without ground truth.
    AttemptsExhausted,
}

impl RejectReason {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::Undecodable(_) => "undecodable",
            RejectReason::Structural(_) => "structural",
            RejectReason::Stale => "stale",
            RejectReason::Evicted => "evicted",
            RejectReason::AttemptsExhausted => "attempts_exhausted",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Undecodable(e) => write!(f, "undecodable: {e}"),
            RejectReason::Structural(e) => write!(f, "structural: {e}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Outcome of one adjudication pass for an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Agreed with ground truth and handed to `validated_message`.
    Validated,
    /// Disagreed with ground truth and handed to `mismatch_message`.
    Mismatched,
    /// Waiting in the pending store.
    Pending,
    Rejected(RejectReason),
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Validated => "validated",
            Classification::Mismatched => "mismatched",
            Classification::Pending => "pending",
            Classification::Rejected(_) => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Classification::Pending)
    }
}
