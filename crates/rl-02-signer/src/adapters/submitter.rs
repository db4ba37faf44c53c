//! In-memory attestation submitter.
//!
//! Stands in for the destination chain's transaction pipeline on devnet and
//! in tests: one stored attestation per claim identity, signatures checked
//! on the way in.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use shared_types::ClaimKey;
use tracing::debug;

use crate::domain::{Attestation, SubmitError};
use crate::ports::{AttestationSubmitter, SubmitOutcome};

#[derive(Default)]
pub struct InMemoryAttestationSubmitter {
    attested: RwLock<HashMap<ClaimKey, Option<Attestation>>>,
    submit_calls: AtomicU32,
    fail_remaining: AtomicU32,
    status_unavailable: AtomicBool,
}

impl InMemoryAttestationSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` as attested by someone else.
    pub fn mark_attested(&self, key: ClaimKey) {
        self.attested.write().entry(key).or_insert(None);
    }

    /// Fail the next `n` submissions with a transport error.
    pub fn fail_next(&self, n: u32) {
        self.fail_remaining.store(n, Ordering::SeqCst);
    }

    /// Make `is_attested` return a transport error.
    pub fn set_status_unavailable(&self, unavailable: bool) {
        self.status_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The attestation this node submitted for `key`.
    pub fn attestation(&self, key: &ClaimKey) -> Option<Attestation> {
        self.attested.read().get(key).cloned().flatten()
    }

    /// Attestations stored through `submit`.
    pub fn side_effects(&self) -> usize {
        self.attested.read().values().filter(|a| a.is_some()).count()
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttestationSubmitter for InMemoryAttestationSubmitter {
    async fn is_attested(&self, key: &ClaimKey) -> Result<bool, SubmitError> {
        if self.status_unavailable.load(Ordering::SeqCst) {
            return Err(SubmitError::Transport("status query unavailable".into()));
        }
        Ok(self.attested.read().contains_key(key))
    }

    async fn submit(&self, attestation: &Attestation) -> Result<SubmitOutcome, SubmitError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SubmitError::Transport("connection reset".into()));
        }

        if attestation.verify().is_err() {
            return Err(SubmitError::Rejected("signature does not verify".into()));
        }

        let mut attested = self.attested.write();
        if attested.contains_key(&attestation.claim_key) {
            return Ok(SubmitOutcome::AlreadySatisfied);
        }
        attested.insert(attestation.claim_key, Some(attestation.clone()));

        let tx_hash: [u8; 32] = Sha256::digest(&attestation.signature).into();
        debug!(claim_key = %attestation.claim_key, "Attestation stored");
        Ok(SubmitOutcome::Submitted { tx_hash })
    }
}
