//! # Signer
//!
//! Owns the attestation key and the queue behind [`SignerHandler`].
//! Submission workers pull validated claims off the queue, skip claims the
//! destination chain already records, sign, and submit with exponential
//! backoff on transport errors.
//!
//! Exactly one on-chain side effect per claim identity comes from three
//! layers: the in-flight set collapses concurrent duplicates, `is_attested`
//! skips finished ones, and the submitter reports `AlreadySatisfied` for
//! anything that slips through both.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use relay_telemetry::metrics::HistogramTimer;
use relay_telemetry::{log_claim_event, ATTESTATIONS, SUBMIT_DURATION};
use shared_bus::{EventPublisher, RelayEvent};
use shared_types::{BroadcastMessage, ClaimKey};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::domain::{
    Attestation, AttestationOutcome, AttestationSigner, SignerConfig, SignerError, SubmitError,
};
use crate::handler::SignerHandler;
use crate::ports::{AttestationSubmitter, SecurityAlertSink, SubmitOutcome};

const SUBSYSTEM: &str = "signer";

/// Claim identities queued or being submitted.
#[derive(Default)]
pub(crate) struct InFlight(Mutex<HashSet<ClaimKey>>);

impl InFlight {
    /// False if `key` was already present.
    pub(crate) fn insert(&self, key: ClaimKey) -> bool {
        self.0.lock().insert(key)
    }

    pub(crate) fn remove(&self, key: &ClaimKey) {
        self.0.lock().remove(key);
    }

    pub(crate) fn contains(&self, key: &ClaimKey) -> bool {
        self.0.lock().contains(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.lock().len()
    }
}

pub struct Signer<S: AttestationSubmitter> {
    config: SignerConfig,
    attestor: AttestationSigner,
    submitter: Arc<S>,
    in_flight: Arc<InFlight>,
    sender: mpsc::Sender<BroadcastMessage>,
    queue: tokio::sync::Mutex<mpsc::Receiver<BroadcastMessage>>,
    events: Option<Arc<dyn EventPublisher>>,
}

impl<S: AttestationSubmitter> Signer<S> {
    pub fn new(config: SignerConfig, attestor: AttestationSigner, submitter: Arc<S>) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        Self {
            config,
            attestor,
            submitter,
            in_flight: Arc::new(InFlight::default()),
            sender,
            queue: tokio::sync::Mutex::new(receiver),
            events: None,
        }
    }

    /// Publish `AttestationSubmitted` on the bus.
    pub fn with_event_publisher(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = Some(events);
        self
    }

    /// A dispatch target feeding this signer's queue.
    pub fn handler(&self, alerts: Arc<dyn SecurityAlertSink>) -> SignerHandler {
        SignerHandler::new(self.sender.clone(), self.in_flight.clone(), alerts)
    }

    pub fn public_key(&self) -> Vec<u8> {
        self.attestor.public_key()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Submission loop. Several workers may share one signer.
    pub async fn run_worker(self: Arc<Self>, worker_id: usize, mut shutdown: watch::Receiver<bool>) {
        info!(worker_id, "Submission worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            let next = {
                let mut queue = self.queue.lock().await;
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => None,
                    message = queue.recv() => message,
                }
            };
            let Some(message) = next else {
                break;
            };
            self.process(message).await;
        }
        info!(worker_id, "Submission worker stopped");
    }

    /// Process everything queued right now, then return.
    pub async fn drain(&self) -> Vec<(ClaimKey, AttestationOutcome)> {
        let mut outcomes = Vec::new();
        loop {
            let next = self.queue.lock().await.try_recv().ok();
            let Some(message) = next else {
                break;
            };
            let key = message.key();
            outcomes.push((key, self.process(message).await));
        }
        outcomes
    }

    /// Attest one validated claim.
    pub async fn process(&self, message: BroadcastMessage) -> AttestationOutcome {
        let key = message.key();
        let outcome = {
            let _timer = HistogramTimer::new(&SUBMIT_DURATION);
            self.attest_and_submit(&message).await
        };
        self.in_flight.remove(&key);

        ATTESTATIONS.with_label_values(&[outcome.label()]).inc();
        match &outcome {
            AttestationOutcome::Failed(reason) => {
                error!(claim_key = %key, reason = %reason, "Attestation failed")
            }
            _ => {
                log_claim_event!(info, SUBSYSTEM, "Attestation complete", key, outcome = outcome.label())
            }
        }

        if outcome.is_success() {
            if let Some(events) = &self.events {
                events
                    .publish(RelayEvent::AttestationSubmitted {
                        claim_key: key,
                        already_satisfied: outcome != AttestationOutcome::Submitted,
                    })
                    .await;
            }
        }
        outcome
    }

    async fn attest_and_submit(&self, message: &BroadcastMessage) -> AttestationOutcome {
        let key = message.key();
        match self.submitter.is_attested(&key).await {
            Ok(true) => return AttestationOutcome::Skipped,
            Ok(false) => {}
            Err(e) => warn!(claim_key = %key, error = %e, "Attestation status unknown, submitting"),
        }

        let attestation = match self.attestor.attest(message) {
            Ok(attestation) => attestation,
            Err(e) => return AttestationOutcome::Failed(e.to_string()),
        };

        match self.submit_with_retry(&attestation).await {
            Ok(SubmitOutcome::Submitted { tx_hash }) => {
                debug!(claim_key = %key, tx_hash = %hex::encode(tx_hash), "Attestation included");
                AttestationOutcome::Submitted
            }
            Ok(SubmitOutcome::AlreadySatisfied) => AttestationOutcome::AlreadySatisfied,
            Err(source) => AttestationOutcome::Failed(SignerError::Submit { key, source }.to_string()),
        }
    }

    async fn submit_with_retry(&self, attestation: &Attestation) -> Result<SubmitOutcome, SubmitError> {
        let mut retry = 0;
        loop {
            match self.submitter.submit(attestation).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_retryable() && retry < self.config.max_submit_retries => {
                    let delay = self.config.backoff_for(retry);
                    warn!(
                        claim_key = %attestation.claim_key,
                        retry = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Submission failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
