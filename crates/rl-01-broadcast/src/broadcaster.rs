//! # Broadcaster
//!
//! Outbound fan-out of claims to peers.
//!
//! The claim is encoded once; each target gets its own copy of the bytes,
//! which every registered hook may inspect or rewrite in registration order
//! before the transport sees it. The broadcaster keeps no per-claim state and
//! never retries: per-peer failures are reported to the caller.

use std::collections::BTreeSet;
use std::sync::Arc;

use relay_telemetry::BROADCAST_SENDS;
use shared_types::{BroadcastMessage, PeerId};
use tracing::{debug, warn};

use crate::errors::{BroadcastError, TransportError};
use crate::ports::outbound::PeerTransport;

/// Interception point run before each per-peer send.
///
/// Hooks exist for test wiring (fault injection, payload capture).
/// Production runs with none registered. A hook cannot fail or cancel a send.
pub trait BroadcasterHook: Send + Sync {
    fn before_broadcast_raw_message(&self, local: &PeerId, target: &PeerId, payload: &mut Vec<u8>);
}

/// Hook that does nothing.
pub struct NoopBroadcasterHook;

impl BroadcasterHook for NoopBroadcasterHook {
    fn before_broadcast_raw_message(&self, _local: &PeerId, _target: &PeerId, _payload: &mut Vec<u8>) {}
}

/// Who a claim is sent to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BroadcastTarget {
    Peer(PeerId),
    Peers(Vec<PeerId>),
    /// Every peer the transport reports as connected.
    All,
}

/// Per-target results of one broadcast.
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub delivered: Vec<PeerId>,
    pub failed: Vec<(PeerId, TransportError)>,
}

impl BroadcastReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Broadcaster<T: PeerTransport> {
    transport: Arc<T>,
    hooks: Vec<Box<dyn BroadcasterHook>>,
}

impl<T: PeerTransport> Broadcaster<T> {
    /// Broadcaster with no hooks.
    pub fn new(transport: Arc<T>) -> Self {
        Self::with_hooks(transport, Vec::new())
    }

    /// Broadcaster running `hooks` in the given order before every send.
    pub fn with_hooks(transport: Arc<T>, hooks: Vec<Box<dyn BroadcasterHook>>) -> Self {
        Self { transport, hooks }
    }

    pub fn local_peer_id(&self) -> PeerId {
        self.transport.local_peer_id()
    }

    /// Encode `message` and send it to each target once.
    ///
    /// Duplicate targets collapse and this node is never a target.
    pub async fn send(
        &self,
        target: &BroadcastTarget,
        message: &BroadcastMessage,
    ) -> Result<BroadcastReport, BroadcastError> {
        let payload = message.to_wire()?;
        let local = self.transport.local_peer_id();
        let key = message.key();

        let mut report = BroadcastReport::default();
        for peer in self.resolve_targets(target, &local) {
            let mut bytes = payload.clone();
            for hook in &self.hooks {
                hook.before_broadcast_raw_message(&local, &peer, &mut bytes);
            }

            match self.transport.send(&peer, bytes).await {
                Ok(()) => {
                    BROADCAST_SENDS.with_label_values(&["delivered"]).inc();
                    report.delivered.push(peer);
                }
                Err(e) => {
                    BROADCAST_SENDS.with_label_values(&["failed"]).inc();
                    warn!(claim_key = %key, peer_id = %peer, error = %e, "Claim send failed");
                    report.failed.push((peer, e));
                }
            }
        }

        debug!(
            claim_key = %key,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Claim broadcast"
        );
        Ok(report)
    }

    fn resolve_targets(&self, target: &BroadcastTarget, local: &PeerId) -> Vec<PeerId> {
        let peers: Vec<PeerId> = match target {
            BroadcastTarget::Peer(peer) => vec![*peer],
            BroadcastTarget::Peers(peers) => peers.clone(),
            BroadcastTarget::All => self.transport.connected_peers(),
        };

        let mut seen = BTreeSet::new();
        peers
            .into_iter()
            .filter(|peer| peer != local && seen.insert(*peer))
            .collect()
    }
}
