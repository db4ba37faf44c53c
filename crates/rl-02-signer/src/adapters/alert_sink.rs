//! Security alert sinks.

use std::sync::Arc;

use relay_telemetry::{peer_label, SECURITY_TARGET};
use shared_bus::{EventPublisher, RelayEvent};
use tracing::warn;

use crate::domain::MismatchAlert;
use crate::ports::SecurityAlertSink;

/// Writes the conflicting claim to the security log target.
pub struct TracingAlertSink;

impl SecurityAlertSink for TracingAlertSink {
    fn raise(&self, alert: MismatchAlert) {
        let claim = serde_json::to_string(&alert.claim).unwrap_or_default();
        warn!(
            target: SECURITY_TARGET,
            claim_key = ?alert.claim_key,
            peer_id = %peer_label(alert.peer.as_ref()),
            receipt_id = %alert.receipt_id,
            claim = %claim,
            "Mismatch alert raised"
        );
    }
}

/// Publishes `MismatchDetected` on the Security topic.
pub struct BusAlertSink {
    bus: Arc<dyn EventPublisher>,
}

impl BusAlertSink {
    pub fn new(bus: Arc<dyn EventPublisher>) -> Self {
        Self { bus }
    }
}

impl SecurityAlertSink for BusAlertSink {
    fn raise(&self, alert: MismatchAlert) {
        let receivers = self.bus.publish_sync(RelayEvent::MismatchDetected {
            claim_key: alert.claim_key,
            peer: alert.peer,
            claim: alert.claim,
        });
        if receivers == 0 {
            warn!(target: SECURITY_TARGET, claim_key = %alert.claim_key, "Mismatch alert had no subscribers");
        }
    }
}
