//! # Multi-Relayer Network
//!
//! Several `RelayerRuntime`s gossiping over one loopback network, each with
//! its own chain view, signer and submitter. Exercises the background tasks:
//! inbound loop, progress listener, sweeper and submission workers.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use relayer_node::{LoopbackNetwork, RelayerConfig, RelayerRuntime};
    use rl_01_broadcast::{Classification, ClaimReceiver, RejectReason};
    use shared_bus::{EventFilter, EventTopic, RelayEvent};
    use shared_types::ClaimPayload;
    use std::future::Future;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn node_config(id: u8) -> RelayerConfig {
        let mut config = RelayerConfig::default();
        config.network.peer_id = peer(id);
        config.signing.signing_key = [id; 32];
        config.signing.relayer_address = RELAYER.into();
        config.dispatch.sweep_interval = Duration::from_millis(10);
        config.submit.backoff = Duration::from_millis(1);
        config.confirmations = Some(1);
        config
    }

    fn start_nodes(network: &LoopbackNetwork, ids: &[u8]) -> Vec<RelayerRuntime> {
        ids.iter()
            .map(|id| {
                let runtime = RelayerRuntime::on_network(node_config(*id), network).unwrap();
                runtime.start().unwrap();
                runtime
            })
            .collect()
    }

    async fn observe(runtime: &RelayerRuntime, payload: ClaimPayload, height: u64) {
        runtime.container().chain_state.record(payload.clone(), height);
        runtime.advance_local_state(payload.source_chain(), height).await;
    }

    async fn eventually<F, Fut>(mut condition: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        tokio::time::timeout(WAIT, async {
            while !condition().await {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    async fn shutdown_all(nodes: Vec<RelayerRuntime>) {
        for node in nodes {
            node.shutdown().await;
        }
    }

    // =========================================================================
    // GOSSIP TO ATTESTATION
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_broadcast_claim_is_attested_by_every_peer() {
        let network = LoopbackNetwork::new();
        let nodes = start_nodes(&network, &[1, 2, 3]);
        for node in &nodes {
            observe(node, deposit(100, 500), 10).await;
        }

        let message = claim(deposit(100, 500), 10);
        let key = message.key();
        let report = nodes[0].broadcast(&message).await.unwrap();
        assert_eq!(report.delivered, vec![peer(2), peer(3)]);

        for node in &nodes[1..] {
            let submitter = node.container().submitter.clone();
            eventually(|| {
                let submitter = submitter.clone();
                async move { submitter.attestation(&key).is_some() }
            })
            .await;
            assert_eq!(submitter.side_effects(), 1);
        }
        // The originator never receives its own claim.
        assert!(nodes[0].container().submitter.attestation(&key).is_none());

        shutdown_all(nodes).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_regossip_does_not_attest_twice() {
        let network = LoopbackNetwork::new();
        let nodes = start_nodes(&network, &[1, 2]);
        observe(&nodes[1], deposit(101, 5), 10).await;

        let message = claim(deposit(101, 5), 10);
        let key = message.key();
        let mut attested = nodes[1]
            .container()
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Attestation]));

        nodes[0].broadcast(&message).await.unwrap();
        let first = tokio::time::timeout(WAIT, attested.recv()).await.unwrap();
        assert!(matches!(
            first,
            Some(RelayEvent::AttestationSubmitted { claim_key, already_satisfied: false }) if claim_key == key
        ));

        nodes[0].broadcast(&message).await.unwrap();
        let second = tokio::time::timeout(WAIT, attested.recv()).await.unwrap();
        assert!(matches!(
            second,
            Some(RelayEvent::AttestationSubmitted { already_satisfied: true, .. })
        ));
        assert_eq!(nodes[1].container().submitter.side_effects(), 1);

        shutdown_all(nodes).await;
    }

    // =========================================================================
    // LOCAL PROGRESS RESOLVES PARKED CLAIMS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_claim_ahead_of_local_view_resolves_on_progress() {
        let network = LoopbackNetwork::new();
        let nodes = start_nodes(&network, &[1, 2]);
        let message = claim(deposit(102, 40), 25);
        let key = message.key();

        nodes[0].broadcast(&message).await.unwrap();
        let store = nodes[1].dispatcher().pending_store().clone();
        eventually(|| {
            let store = store.clone();
            async move { store.contains(&key) }
        })
        .await;

        observe(&nodes[1], deposit(102, 40), 25).await;

        let submitter = nodes[1].container().submitter.clone();
        eventually(|| {
            let submitter = submitter.clone();
            async move { submitter.attestation(&key).is_some() }
        })
        .await;
        assert!(store.is_empty());

        shutdown_all(nodes).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sweeper_discards_expired_claims() {
        let network = LoopbackNetwork::new();
        let mut config = node_config(2);
        config.dispatch.pending_ttl = Duration::from_millis(50);
        let receiver = RelayerRuntime::on_network(config, &network).unwrap();
        receiver.start().unwrap();
        let sender = start_nodes(&network, &[1]).remove(0);
        let mut rejected = receiver
            .container()
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Dispatch]));

        let message = claim(deposit(103, 1), 1_000);
        let key = message.key();
        sender.broadcast(&message).await.unwrap();

        match tokio::time::timeout(WAIT, rejected.recv()).await.unwrap() {
            Some(RelayEvent::ClaimRejected { claim_key, peer: from, reason }) => {
                assert_eq!(claim_key, key);
                assert_eq!(from, Some(peer(1)));
                assert_eq!(reason, "stale");
            }
            other => panic!("expected ClaimRejected, got {other:?}"),
        }
        assert!(receiver.dispatcher().pending_store().is_empty());
        assert_eq!(receiver.container().submitter.side_effects(), 0);

        shutdown_all(vec![sender, receiver]).await;
    }

    // =========================================================================
    // LYING PEER
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lying_peer_is_reported() {
        let network = LoopbackNetwork::new();
        let nodes = start_nodes(&network, &[1, 2]);
        observe(&nodes[1], deposit(104, 90), 10).await;
        let mut security = nodes[1]
            .container()
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Security]));

        let inflated = claim(deposit(104, 100), 10);
        nodes[0].broadcast(&inflated).await.unwrap();

        match tokio::time::timeout(WAIT, security.recv()).await.unwrap() {
            Some(RelayEvent::MismatchDetected { claim_key, peer: from, claim }) => {
                assert_eq!(claim_key, inflated.key());
                assert_eq!(from, Some(peer(1)));
                assert_eq!(claim, inflated);
            }
            other => panic!("expected MismatchDetected, got {other:?}"),
        }
        assert_eq!(nodes[1].container().submitter.side_effects(), 0);

        shutdown_all(nodes).await;
    }

    #[tokio::test]
    async fn test_garbage_frame_is_dropped() {
        let network = LoopbackNetwork::new();
        let runtime = RelayerRuntime::on_network(node_config(2), &network).unwrap();

        let outcome = runtime
            .dispatcher()
            .handle_inbound(peer(9), b"{not json".to_vec())
            .await;

        assert!(matches!(
            outcome,
            Classification::Rejected(RejectReason::Undecodable(_))
        ));
        assert!(runtime.dispatcher().pending_store().is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_without_peers_reaches_nobody() {
        let network = LoopbackNetwork::new();
        let runtime = RelayerRuntime::on_network(node_config(1), &network).unwrap();

        let report = runtime
            .broadcast(&claim(conversion(0x5A, 7), 3))
            .await
            .unwrap();

        assert!(report.delivered.is_empty());
        assert!(report.is_complete());
    }
}
