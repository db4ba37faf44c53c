//! # Dispatch Guarantees
//!
//! Cross-crate checks of the relay's ordering, uniqueness and idempotence
//! guarantees, including under concurrent access.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use relayer_node::LoopbackNetwork;
    use rl_01_broadcast::{
        BroadcastTarget, Broadcaster, BroadcasterHook, Classification, DispatchConfig, Dispatcher,
        MessageWithPeerMetadata, PendingStore, RejectReason,
    };
    use rl_02_signer::{AttestationOutcome, InMemoryChainState};
    use shared_types::{
        BroadcastMessage, ClaimPayload, Coin, CoinConversion, EthereumDeposit, PeerId, U256,
    };
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    // =========================================================================
    // PENDING STORE: one entry per claim identity
    // =========================================================================

    #[test]
    fn test_second_put_replaces_first_payload() {
        let store = PendingStore::new(16, 8);
        let deadline = Instant::now() + Duration::from_secs(60);

        store.put(MessageWithPeerMetadata::inbound(claim(deposit(7, 100), 10), peer(1), deadline));
        store.put(MessageWithPeerMetadata::inbound(claim(deposit(7, 250), 10), peer(2), deadline));

        assert_eq!(store.len(), 1);
        let entry = store.get(&deposit(7, 0).key()).expect("entry present");
        assert_eq!(entry.envelope.message().payload, deposit(7, 250));
        assert_eq!(entry.envelope.peer_id(), Some(&peer(2)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_leave_one_entry() {
        let store = Arc::new(PendingStore::new(1024, 8));
        let deadline = Instant::now() + Duration::from_secs(60);

        let handles: Vec<_> = (0..64u64)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let message = claim(deposit(9, 100 + i), 10);
                    store.put(MessageWithPeerMetadata::inbound(message, peer((i % 8) as u8), deadline));
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.keys(), vec![deposit(9, 0).key()]);
    }

    // =========================================================================
    // SWEEP: each expired entry discarded exactly once
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sweeps_discard_each_entry_once() {
        let dispatcher = Arc::new(Dispatcher::new(
            DispatchConfig::default(),
            Arc::new(InMemoryChainState::new()),
            Arc::new(NullHandler),
        ));
        let deadline = Instant::now() + Duration::from_secs(1);
        for sequence in 0..200u64 {
            let envelope = MessageWithPeerMetadata::inbound(claim(deposit(sequence, 1), 10), peer(1), deadline);
            dispatcher.pending_store().put(envelope);
        }

        let later = deadline + Duration::from_secs(1);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move { dispatcher.sweep_expired(later) })
            })
            .collect();

        let mut swept = Vec::new();
        for handle in handles {
            swept.extend(handle.await.unwrap());
        }

        let unique: HashSet<_> = swept.iter().copied().collect();
        assert_eq!(swept.len(), 200);
        assert_eq!(unique.len(), 200);
        assert!(dispatcher.pending_store().is_empty());
        assert!(dispatcher.sweep_expired(later).is_empty());
    }

    #[test]
    fn test_sweep_leaves_live_entries() {
        let store = PendingStore::new(16, 8);
        let now = Instant::now();
        store.put(MessageWithPeerMetadata::inbound(claim(deposit(1, 1), 10), peer(1), now + Duration::from_secs(1)));
        store.put(MessageWithPeerMetadata::inbound(claim(deposit(2, 1), 10), peer(1), now + Duration::from_secs(60)));

        let expired: Vec<_> = store.sweep(now + Duration::from_secs(2)).map(|e| e.key()).collect();

        assert_eq!(expired, vec![deposit(1, 0).key()]);
        assert_eq!(store.keys(), vec![deposit(2, 0).key()]);
    }

    // =========================================================================
    // HANDLER ORDERING
    // =========================================================================

    #[tokio::test]
    async fn test_raw_message_fires_once_and_first() {
        let node = TestNode::new();
        node.confirm(deposit(1, 100), 50);
        node.confirm(deposit(2, 90), 50);
        node.chain_state.record(deposit(3, 100), 500);

        let messages = vec![
            claim(deposit(1, 100), 50),  // validated
            claim(deposit(2, 100), 50),  // mismatch
            claim(deposit(3, 100), 500), // pending
            claim(deposit(4, 0), 50),    // structural
        ];

        let mut receipts = Vec::new();
        for message in messages {
            let envelope = node.dispatcher.envelope_for(peer(1), message);
            receipts.push((envelope.receipt_id(), envelope.key()));
            node.dispatcher.dispatch(envelope).await;
        }

        let calls = node.handler.calls();
        for (receipt, key) in receipts {
            let raw_positions: Vec<usize> = calls
                .iter()
                .enumerate()
                .filter(|(_, call)| matches!(call, Call::Raw { receipt: r, .. } if *r == receipt))
                .map(|(i, _)| i)
                .collect();
            assert_eq!(raw_positions.len(), 1, "raw_message must fire exactly once");

            let downstream = calls.iter().position(|call| match call {
                Call::Validated(message) => message.key() == key,
                Call::Mismatch { receipt: r, .. } => *r == receipt,
                Call::Raw { .. } => false,
            });
            if let Some(position) = downstream {
                assert!(raw_positions[0] < position);
            }
        }
    }

    // =========================================================================
    // STRUCTURAL REJECTS NEVER REACH THE SIGNER
    // =========================================================================

    fn structurally_invalid() -> Vec<(&'static str, BroadcastMessage)> {
        let mut bad_erc20 = EthereumDeposit {
            ethereum_erc20_address: "0x1234".into(),
            amount: U256::from(100u64),
            receiver: RECEIVER.into(),
            sequence: U256::from(61u64),
        };
        let bad_receiver = EthereumDeposit {
            receiver: "fury142424242424242424242424242424242d4jmgn".into(),
            ..bad_erc20.clone()
        };
        bad_erc20.sequence = U256::from(60u64);

        let conversion_with = |tx: u8, initiator: &str, denom: &str, amount: u64| {
            ClaimPayload::CoinConversion(CoinConversion {
                tx_hash: [tx; 32],
                initiator: initiator.into(),
                receiver: RECEIVER.into(),
                amount: Coin::new(denom, U256::from(amount)),
            })
        };

        vec![
            ("zero deposit amount", claim(deposit(62, 0), 10)),
            ("bad erc20 address", claim(ClaimPayload::EthereumDeposit(bad_erc20), 10)),
            ("bad receiver address", claim(ClaimPayload::EthereumDeposit(bad_receiver), 10)),
            ("zero tx hash", claim(conversion_with(0, INITIATOR, "ufury", 5), 10)),
            ("bad initiator", claim(conversion_with(1, "cosmos1xyz", "ufury", 5), 10)),
            ("bad denom", claim(conversion_with(2, INITIATOR, "1bad", 5), 10)),
            ("zero coin amount", claim(conversion_with(3, INITIATOR, "ufury", 0), 10)),
            (
                "zero ttl",
                BroadcastMessage::new(deposit(63, 100), 10, unix_now(), 0),
            ),
        ]
    }

    #[tokio::test]
    async fn test_structural_reject_has_no_downstream_call() {
        for (name, message) in structurally_invalid() {
            let node = TestNode::new();
            // Ground truth agrees, so validation is the only gate.
            node.confirm(message.payload.clone(), message.observed_height);

            let envelope = node.dispatcher.envelope_for(peer(1), message);
            let receipt = envelope.receipt_id();
            let key = envelope.key();
            let outcome = node.dispatcher.dispatch(envelope).await;

            assert!(
                matches!(outcome, Classification::Rejected(_)),
                "{name}: expected reject, got {outcome:?}"
            );
            assert_eq!(node.handler.calls(), vec![Call::Raw { receipt, key }], "{name}");
            assert!(node.dispatcher.pending_store().is_empty(), "{name}");
            assert!(node.signer.drain().await.is_empty(), "{name}");
        }
    }

    #[tokio::test]
    async fn test_structural_reason_reported() {
        let node = TestNode::new();
        let outcome = node
            .dispatcher
            .dispatch(node.dispatcher.envelope_for(peer(1), claim(deposit(62, 0), 10)))
            .await;

        assert!(matches!(
            outcome,
            Classification::Rejected(RejectReason::Structural(_))
        ));
    }

    // =========================================================================
    // VALIDATED CLAIMS ARE PASSED THROUGH UNCHANGED
    // =========================================================================

    #[tokio::test]
    async fn test_validated_claim_is_the_peer_claim() {
        let node = TestNode::new();
        // Local derivation spells the addresses differently.
        node.confirm(
            ClaimPayload::EthereumDeposit(EthereumDeposit {
                ethereum_erc20_address: ERC20.to_lowercase(),
                amount: U256::from(100u64),
                receiver: RECEIVER.trim_start_matches("0x").into(),
                sequence: U256::from(70u64),
            }),
            10,
        );

        let message = claim(deposit(70, 100), 10);
        let outcome = node
            .dispatcher
            .dispatch(node.dispatcher.envelope_for(peer(5), message.clone()))
            .await;

        assert_eq!(outcome, Classification::Validated);
        assert!(node.handler.calls().contains(&Call::Validated(message)));
    }

    // =========================================================================
    // SIGNER IDEMPOTENCE
    // =========================================================================

    #[tokio::test]
    async fn test_same_claim_attested_once() {
        let node = TestNode::new();
        let message = claim(deposit(80, 100), 10);

        assert_eq!(node.signer.process(message.clone()).await, AttestationOutcome::Submitted);
        assert_eq!(node.signer.process(message).await, AttestationOutcome::Skipped);
        assert_eq!(node.submitter.side_effects(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_validation_is_queued_once() {
        let node = TestNode::new();
        node.confirm(deposit(81, 100), 10);

        for sender in [peer(1), peer(2), peer(3)] {
            let envelope = node.dispatcher.envelope_for(sender, claim(deposit(81, 100), 10));
            assert_eq!(node.dispatcher.dispatch(envelope).await, Classification::Validated);
        }

        let outcomes = node.signer.drain().await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(node.submitter.side_effects(), 1);
    }

    #[tokio::test]
    async fn test_unknown_status_still_single_side_effect() {
        let node = TestNode::new();
        let message = claim(deposit(82, 100), 10);
        node.signer.process(message.clone()).await;

        node.submitter.set_status_unavailable(true);
        assert_eq!(
            node.signer.process(message).await,
            AttestationOutcome::AlreadySatisfied
        );
        assert_eq!(node.submitter.side_effects(), 1);
    }

    // =========================================================================
    // BROADCASTER HOOKS OVER THE LOOPBACK NETWORK
    // =========================================================================

    struct Tamper;

    impl BroadcasterHook for Tamper {
        fn before_broadcast_raw_message(&self, _local: &PeerId, _target: &PeerId, payload: &mut Vec<u8>) {
            *payload = b"tampered".to_vec();
        }
    }

    struct Suffix(u8);

    impl BroadcasterHook for Suffix {
        fn before_broadcast_raw_message(&self, _local: &PeerId, _target: &PeerId, payload: &mut Vec<u8>) {
            payload.push(self.0);
        }
    }

    #[tokio::test]
    async fn test_mutating_hook_changes_bytes_on_the_wire() {
        let network = LoopbackNetwork::new();
        let (sender, _sender_rx) = network.join(peer(1), 8);
        let (_receiver, mut receiver_rx) = network.join(peer(2), 8);

        let broadcaster = Broadcaster::with_hooks(
            Arc::new(sender),
            vec![Box::new(Tamper), Box::new(Suffix(b'!'))],
        );
        let report = broadcaster
            .send(&BroadcastTarget::All, &claim(deposit(90, 1), 10))
            .await
            .unwrap();

        assert_eq!(report.delivered, vec![peer(2)]);
        assert_eq!(receiver_rx.recv().await, Some((peer(1), b"tampered!".to_vec())));
    }

    #[tokio::test]
    async fn test_no_hooks_leaves_bytes_unmodified() {
        let network = LoopbackNetwork::new();
        let (sender, _sender_rx) = network.join(peer(1), 8);
        let (_receiver, mut receiver_rx) = network.join(peer(2), 8);
        let message = claim(deposit(91, 1), 10);

        Broadcaster::new(Arc::new(sender))
            .send(&BroadcastTarget::Peer(peer(2)), &message)
            .await
            .unwrap();

        let (from, bytes) = receiver_rx.recv().await.unwrap();
        assert_eq!(from, peer(1));
        assert_eq!(bytes, message.to_wire().unwrap());
        assert_eq!(BroadcastMessage::from_wire(&bytes).unwrap(), message);
    }
}
