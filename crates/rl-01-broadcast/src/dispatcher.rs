//! # Dispatcher
//!
//! The decision core for inbound claims.
//!
//! ## Pipeline
//!
//! 1. `raw_message` on the handler, always and first.
//! 2. Expired on arrival, structurally invalid or created too far ahead of
//!    the local clock: rejected, nothing else runs.
//! 3. Ground truth from the [`ChainStateReader`]:
//!    - not available yet (or the reader failed): parked in the pending store
//!    - agrees: `validated_message`
//!    - disagrees, or the event is absent: `mismatch_message`
//! 4. Parked claims are re-offered when the local view of their source chain
//!    advances and discarded as stale
//!    by the sweep once their deadline passes.
//!
//! Mismatch only ever compares a claim against local ground truth. Two peers
//! sending different content for the same claim are not compared with each
//! other; the later `put` simply replaces the earlier one.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use relay_telemetry::{
    log_claim_event, peer_label, CLAIMS_REJECTED, CLAIM_OUTCOMES, PENDING_ENTRIES, RAW_MESSAGES,
};
use shared_bus::{EventPublisher, RelayEvent};
use shared_types::{BroadcastMessage, ChainId, ClaimKey, PeerId};
use tracing::{debug, info, warn};

use crate::domain::{
    deadline_for, Classification, DispatchConfig, MessageWithPeerMetadata, PendingStore,
    PutOutcome, RejectReason, RequeueOutcome, MAX_CLOCK_SKEW,
};
use crate::ports::inbound::{BroadcastHandler, ClaimReceiver};
use crate::ports::outbound::{ChainStateReader, Observation};

const SUBSYSTEM: &str = "dispatcher";

enum Verdict {
    Agrees,
    Disagrees,
    Unavailable,
}

/// Routes inbound claims to a [`BroadcastHandler`].
///
/// Thread-safe; share via `Arc`. The pending store is the only shared mutable
/// state and guards itself.
pub struct Dispatcher<R, H>
where
    R: ChainStateReader,
    H: BroadcastHandler,
{
    config: DispatchConfig,
    store: Arc<PendingStore>,
    reader: Arc<R>,
    handler: Arc<H>,
    events: Option<Arc<dyn EventPublisher>>,
}

impl<R, H> Dispatcher<R, H>
where
    R: ChainStateReader,
    H: BroadcastHandler,
{
    pub fn new(config: DispatchConfig, reader: Arc<R>, handler: Arc<H>) -> Self {
        let store = Arc::new(PendingStore::new(
            config.max_pending,
            config.max_resolution_attempts,
        ));
        Self {
            config,
            store,
            reader,
            handler,
            events: None,
        }
    }

    /// Publish `ClaimValidated` / `ClaimRejected` on the bus.
    pub fn with_event_publisher(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn pending_store(&self) -> &Arc<PendingStore> {
        &self.store
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Wrap a claim received from `peer` now.
    pub fn envelope_for(&self, peer: PeerId, message: BroadcastMessage) -> MessageWithPeerMetadata {
        let deadline = deadline_for(&message, self.config.default_ttl, Instant::now(), unix_now());
        MessageWithPeerMetadata::inbound(message, peer, deadline)
    }

    /// Run one envelope through the pipeline.
    pub async fn dispatch(&self, envelope: MessageWithPeerMetadata) -> Classification {
        RAW_MESSAGES.inc();
        self.handler.raw_message(&envelope);

        let key = envelope.key();
        let peer = envelope.peer_id().copied();

        if envelope.is_expired(Instant::now()) {
            return self.reject(key, peer, RejectReason::Stale);
        }

        if let Err(e) = envelope
            .message()
            .validate_basic()
            .and_then(|_| envelope.message().validate_created(unix_now(), MAX_CLOCK_SKEW.as_secs()))
        {
            return self.reject(key, peer, RejectReason::Structural(e));
        }

        match self.verdict(envelope.message()).await {
            Verdict::Agrees => self.validated(envelope),
            Verdict::Disagrees => self.mismatched(envelope),
            Verdict::Unavailable => self.park(envelope),
        }
    }

    /// Re-offer the pending claims whose event lives on `chain`.
    ///
    /// Called when the local view of `chain` advances. Claims still
    /// unavailable go back into the store with one more attempt counted.
    /// Claims from other chains are left untouched.
    pub async fn on_local_progress(&self, chain: ChainId) -> Vec<(ClaimKey, Classification)> {
        let mut outcomes = Vec::new();

        for key in self.store.keys_for(chain) {
            // Lost to a concurrent sweep or re-offer.
            let Some(entry) = self.store.take_entry(&key) else {
                continue;
            };
            let peer = entry.envelope.peer_id().copied();

            let outcome = if entry.envelope.is_expired(Instant::now()) {
                self.reject(key, peer, RejectReason::Stale)
            } else {
                match self.verdict(entry.envelope.message()).await {
                    Verdict::Agrees => self.validated(entry.envelope),
                    Verdict::Disagrees => self.mismatched(entry.envelope),
                    Verdict::Unavailable => match self.store.requeue(entry) {
                        RequeueOutcome::Requeued | RequeueOutcome::Superseded => {
                            Classification::Pending
                        }
                        RequeueOutcome::AttemptsExhausted(_) => {
                            self.reject(key, peer, RejectReason::AttemptsExhausted)
                        }
                        RequeueOutcome::Full(_) => self.reject(key, peer, RejectReason::Evicted),
                    },
                }
            };
            outcomes.push((key, outcome));
        }

        PENDING_ENTRIES.set(self.store.len() as f64);
        outcomes
    }

    /// Discard every pending claim whose deadline passed by `now`.
    pub fn sweep_expired(&self, now: Instant) -> Vec<ClaimKey> {
        let expired: Vec<ClaimKey> = self
            .store
            .sweep(now)
            .map(|envelope| {
                let key = envelope.key();
                self.reject(key, envelope.peer_id().copied(), RejectReason::Stale);
                key
            })
            .collect();

        if !expired.is_empty() {
            debug!(count = expired.len(), "Swept stale claims");
        }
        PENDING_ENTRIES.set(self.store.len() as f64);
        expired
    }

    async fn verdict(&self, message: &BroadcastMessage) -> Verdict {
        match self.reader.observe(message).await {
            Ok(Observation::Known(derived)) if message.payload.agrees_with(&derived) => {
                Verdict::Agrees
            }
            Ok(Observation::Known(_)) | Ok(Observation::NotFound) => Verdict::Disagrees,
            Ok(Observation::NotYetKnown) => Verdict::Unavailable,
            Err(e) => {
                warn!(claim_key = %message.key(), error = %e, "Chain state read failed, deferring claim");
                Verdict::Unavailable
            }
        }
    }

    fn validated(&self, envelope: MessageWithPeerMetadata) -> Classification {
        let key = envelope.key();
        let peer = envelope.peer_id().copied();
        log_claim_event!(info, SUBSYSTEM, "Claim validated", key, peer_id = %peer_label(peer.as_ref()));

        self.handler.validated_message(envelope.into_message());
        self.publish(RelayEvent::ClaimValidated {
            claim_key: key,
            peer,
        });
        self.count(&Classification::Validated)
    }

    fn mismatched(&self, envelope: MessageWithPeerMetadata) -> Classification {
        warn!(
            claim_key = %envelope.key(),
            peer_id = %peer_label(envelope.peer_id()),
            "Claim disagrees with local ground truth"
        );
        self.handler.mismatch_message(envelope);
        self.count(&Classification::Mismatched)
    }

    fn park(&self, envelope: MessageWithPeerMetadata) -> Classification {
        let key = envelope.key();
        log_claim_event!(debug, SUBSYSTEM, "Ground truth not available, claim pending", key);

        let outcome = match self.store.put(envelope) {
            PutOutcome::Inserted => Classification::Pending,
            PutOutcome::Replaced(old) => {
                debug!(claim_key = %key, superseded = %old.receipt_id(), "Pending claim superseded");
                Classification::Pending
            }
            PutOutcome::Evicted(old) => {
                self.reject(old.key(), old.peer_id().copied(), RejectReason::Evicted);
                Classification::Pending
            }
        };
        PENDING_ENTRIES.set(self.store.len() as f64);
        self.count(&outcome)
    }

    fn reject(&self, key: ClaimKey, peer: Option<PeerId>, reason: RejectReason) -> Classification {
        match &reason {
            RejectReason::Evicted | RejectReason::AttemptsExhausted => {
                warn!(claim_key = %key, peer_id = %peer_label(peer.as_ref()), reason = %reason, "Claim dropped")
            }
            _ => debug!(claim_key = %key, peer_id = %peer_label(peer.as_ref()), reason = %reason, "Claim rejected"),
        }

        CLAIMS_REJECTED.with_label_values(&[reason.label()]).inc();
        self.publish(RelayEvent::ClaimRejected {
            claim_key: key,
            peer,
            reason: reason.to_string(),
        });
        self.count(&Classification::Rejected(reason))
    }

    fn count(&self, outcome: &Classification) -> Classification {
        CLAIM_OUTCOMES.with_label_values(&[outcome.label()]).inc();
        outcome.clone()
    }

    fn publish(&self, event: RelayEvent) {
        if let Some(events) = &self.events {
            events.publish_sync(event);
        }
    }
}

#[async_trait]
impl<R, H> ClaimReceiver for Dispatcher<R, H>
where
    R: ChainStateReader,
    H: BroadcastHandler,
{
    async fn handle_inbound(&self, peer: PeerId, payload: Vec<u8>) -> Classification {
        let message = match BroadcastMessage::from_wire(&payload) {
            Ok(message) => message,
            Err(e) => {
                // No envelope is formed, so no handler sees this.
                debug!(peer_id = %peer, error = %e, "Undecodable claim payload");
                let reason = RejectReason::Undecodable(e.to_string());
                CLAIMS_REJECTED.with_label_values(&[reason.label()]).inc();
                return self.count(&Classification::Rejected(reason));
            }
        };

        let envelope = self.envelope_for(peer, message);
        info!(
            claim_key = %envelope.key(),
            peer_id = %peer,
            kind = envelope.message().payload.kind(),
            "Claim received"
        );
        self.dispatch(envelope).await
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
