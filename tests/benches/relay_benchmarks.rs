//! # Fury Relayer Benchmarks
//!
//! | Component | Operation | Target |
//! |-----------|-----------|--------|
//! | rl-01 Pending Store | put / try_resolve | < 10us |
//! | rl-01 Pending Store | sweep of 10k expired entries | < 10ms |
//! | rl-01 Dispatcher | validated claim end to end | < 100us |
//! | rl-02 Signer | attest (SHA-256 + ECDSA sign) | < 1ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use relay_tests::fixtures::*;
use rl_01_broadcast::{MessageWithPeerMetadata, PendingStore};
use rl_02_signer::AttestationSigner;
use std::time::{Duration, Instant};

// ============================================================================
// RL-01: Pending Store
// ============================================================================

fn bench_pending_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("rl-01-pending-store");
    let deadline = Instant::now() + Duration::from_secs(3600);

    group.bench_function("put_then_resolve", |b| {
        let store = PendingStore::new(10_000, 64);
        let mut rng = rand::thread_rng();
        b.iter(|| {
            let message = claim(deposit(rng.gen_range(0..5_000), 100), 10);
            let key = message.key();
            store.put(MessageWithPeerMetadata::inbound(message, peer(1), deadline));
            black_box(store.try_resolve(&key))
        })
    });

    group.bench_function("put_same_identity", |b| {
        let store = PendingStore::new(10_000, 64);
        let mut amount = 0u64;
        b.iter(|| {
            amount += 1;
            let message = claim(deposit(42, amount), 10);
            black_box(store.put(MessageWithPeerMetadata::inbound(message, peer(1), deadline)))
        })
    });

    for size in [100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("sweep_all_expired", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let store = PendingStore::new(size, 64);
                    let soon = Instant::now() + Duration::from_millis(1);
                    for sequence in 0..size as u64 {
                        store.put(MessageWithPeerMetadata::inbound(
                            claim(deposit(sequence, 1), 10),
                            peer(1),
                            soon,
                        ));
                    }
                    store
                },
                |store| black_box(store.sweep(Instant::now() + Duration::from_secs(1)).count()),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

// ============================================================================
// RL-01: Dispatcher
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("rl-01-dispatcher");
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    group.bench_function("dispatch_validated", |b| {
        let node = TestNode::new();
        for sequence in 0..1_000u64 {
            node.chain_state.record(deposit(sequence, 100), 10);
        }
        node.chain_state.advance(shared_types::ChainId::Ethereum, 10);
        let mut sequence = 0u64;

        b.iter(|| {
            sequence = (sequence + 1) % 1_000;
            let envelope = node
                .dispatcher
                .envelope_for(peer(1), claim(deposit(sequence, 100), 10));
            let outcome = runtime.block_on(node.dispatcher.dispatch(envelope));
            runtime.block_on(node.signer.drain());
            black_box(outcome)
        })
    });

    group.bench_function("dispatch_structural_reject", |b| {
        let node = TestNode::new();
        b.iter(|| {
            let envelope = node.dispatcher.envelope_for(peer(1), claim(deposit(1, 0), 10));
            black_box(runtime.block_on(node.dispatcher.dispatch(envelope)))
        })
    });

    group.finish();
}

// ============================================================================
// RL-02: Attestation signing
// ============================================================================

fn bench_attestation(c: &mut Criterion) {
    let mut group = c.benchmark_group("rl-02-signer");
    group.measurement_time(Duration::from_secs(10));

    let signer = AttestationSigner::from_bytes(&SIGNING_KEY, RELAYER).expect("valid key");
    let message = claim(deposit(42, 100), 10);
    let attestation = signer.attest(&message).expect("attest");

    group.bench_function("attest", |b| b.iter(|| black_box(signer.attest(&message))));
    group.bench_function("verify", |b| b.iter(|| black_box(attestation.verify())));

    group.finish();
}

criterion_group!(benches, bench_pending_store, bench_dispatch, bench_attestation);
criterion_main!(benches);
