//! # Signer Handler
//!
//! The production [`BroadcastHandler`]. Validated claims are queued for the
//! submission workers; mismatches become security alerts. Nothing here
//! blocks or awaits.

use std::sync::Arc;

use relay_telemetry::{log_claim_event, peer_label, ATTESTATIONS, MISMATCHES, SECURITY_TARGET};
use rl_01_broadcast::{BroadcastHandler, MessageWithPeerMetadata};
use shared_types::BroadcastMessage;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{error, warn};

use crate::domain::MismatchAlert;
use crate::ports::SecurityAlertSink;
use crate::signer::InFlight;

const SUBSYSTEM: &str = "signer";

/// Dispatch target that feeds the signer.
pub struct SignerHandler {
    queue: mpsc::Sender<BroadcastMessage>,
    in_flight: Arc<InFlight>,
    alerts: Arc<dyn SecurityAlertSink>,
}

impl SignerHandler {
    pub(crate) fn new(
        queue: mpsc::Sender<BroadcastMessage>,
        in_flight: Arc<InFlight>,
        alerts: Arc<dyn SecurityAlertSink>,
    ) -> Self {
        Self {
            queue,
            in_flight,
            alerts,
        }
    }
}

impl BroadcastHandler for SignerHandler {
    fn raw_message(&self, _envelope: &MessageWithPeerMetadata) {}

    fn validated_message(&self, message: BroadcastMessage) {
        let key = message.key();
        if !self.in_flight.insert(key) {
            log_claim_event!(debug, SUBSYSTEM, "Attestation already in flight", key);
            return;
        }

        match self.queue.try_send(message) {
            Ok(()) => log_claim_event!(debug, SUBSYSTEM, "Claim queued for attestation", key),
            Err(TrySendError::Full(_)) => {
                self.in_flight.remove(&key);
                ATTESTATIONS.with_label_values(&["dropped"]).inc();
                warn!(claim_key = %key, "Attestation queue full, claim dropped");
            }
            Err(TrySendError::Closed(_)) => {
                self.in_flight.remove(&key);
                ATTESTATIONS.with_label_values(&["dropped"]).inc();
                error!(claim_key = %key, "Attestation queue closed, claim dropped");
            }
        }
    }

    fn mismatch_message(&self, envelope: MessageWithPeerMetadata) {
        MISMATCHES.inc();
        let claim_key = envelope.key();
        let peer = envelope.peer_id().copied();
        let receipt_id = envelope.receipt_id();

        error!(
            target: SECURITY_TARGET,
            claim_key = %claim_key,
            peer_id = %peer_label(peer.as_ref()),
            receipt_id = %receipt_id,
            kind = envelope.message().payload.kind(),
            "Peer claim conflicts with local ground truth"
        );

        self.alerts.raise(MismatchAlert {
            claim_key,
            peer,
            receipt_id,
            claim: envelope.into_message(),
        });
    }
}
