//! Outbound ports (SPI) for the signer.

use crate::domain::{Attestation, MismatchAlert, SubmitError};
use async_trait::async_trait;
use shared_types::{ClaimKey, Hash};

/// What the destination chain did with a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted in a new transaction.
    Submitted { tx_hash: Hash },
    /// This claim identity was already attested; no new side effect.
    AlreadySatisfied,
}

/// Destination-chain transaction pipeline.
#[async_trait]
pub trait AttestationSubmitter: Send + Sync {
    /// Whether the chain already records an attestation for `key`.
    async fn is_attested(&self, key: &ClaimKey) -> Result<bool, SubmitError>;

    async fn submit(&self, attestation: &Attestation) -> Result<SubmitOutcome, SubmitError>;
}

/// Operator-facing channel for conflicting claims.
///
/// Must not block; called from the dispatch path.
pub trait SecurityAlertSink: Send + Sync {
    fn raise(&self, alert: MismatchAlert);
}
