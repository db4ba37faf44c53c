//! # Signer Errors

use shared_types::{ClaimKey, ValidationError};
use thiserror::Error;

/// Failures while turning a validated claim into an attestation.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The configured secret is not a usable secp256k1 scalar.
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    /// The attested message failed structural validation.
    #[error("Attestation message invalid: {0}")]
    Validation(#[from] ValidationError),

    /// Canonical encoding of the attested message failed.
    #[error("Failed to encode attestation: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Signing failed: {0}")]
    Signing(String),

    /// Signature or public key bytes did not verify.
    #[error("Attestation signature does not verify")]
    InvalidSignature,

    /// Submission gave up or was refused.
    #[error("Submission failed for {key}: {source}")]
    Submit {
        key: ClaimKey,
        #[source]
        source: SubmitError,
    },
}

/// Attestation submitter failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Network or RPC failure. Retried with backoff.
    #[error("Submitter transport error: {0}")]
    Transport(String),

    /// The destination chain refused the attestation. Not retried.
    #[error("Attestation rejected: {0}")]
    Rejected(String),
}

impl SubmitError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::Transport(_))
    }
}
