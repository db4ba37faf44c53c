//! # Test Fixtures
//!
//! Claim builders and a fully wired single relayer for cross-crate tests.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rl_01_broadcast::{BroadcastHandler, DispatchConfig, Dispatcher, MessageWithPeerMetadata};
use rl_02_signer::{
    AttestationSigner, BusAlertSink, InMemoryAttestationSubmitter, InMemoryChainState, Signer,
    SignerConfig, SignerHandler,
};
use shared_bus::InMemoryEventBus;
use shared_types::{
    BroadcastMessage, ChainId, ClaimKey, ClaimPayload, CoinConversion, Coin, EthereumDeposit,
    PeerId, U256,
};
use uuid::Uuid;

pub const ERC20: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
pub const RECEIVER: &str = "0x4A59E9DDB116A04C5D40082D67C738D5C56DF124";
pub const RELAYER: &str = "fury142424242424242424242424242424242d4jmgn";
pub const INITIATOR: &str = "fury1zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg33k7dpq";
pub const SIGNING_KEY: [u8; 32] = [7u8; 32];

// =============================================================================
// CLAIM BUILDERS
// =============================================================================

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub fn peer(n: u8) -> PeerId {
    PeerId::new([n; 32])
}

pub fn deposit(sequence: u64, amount: u64) -> ClaimPayload {
    ClaimPayload::EthereumDeposit(EthereumDeposit {
        ethereum_erc20_address: ERC20.into(),
        amount: U256::from(amount),
        receiver: RECEIVER.into(),
        sequence: U256::from(sequence),
    })
}

pub fn conversion(tx_byte: u8, amount: u64) -> ClaimPayload {
    ClaimPayload::CoinConversion(CoinConversion {
        tx_hash: [tx_byte; 32],
        initiator: INITIATOR.into(),
        receiver: RECEIVER.into(),
        amount: Coin::new("erc20/0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", U256::from(amount)),
    })
}

/// Live claim observed at `height`, created now with a five minute TTL.
pub fn claim(payload: ClaimPayload, height: u64) -> BroadcastMessage {
    BroadcastMessage::new(payload, height, unix_now(), 300)
}

// =============================================================================
// RECORDING HANDLER
// =============================================================================

/// One handler invocation, in the order the dispatcher made it.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Raw { receipt: Uuid, key: ClaimKey },
    Validated(BroadcastMessage),
    Mismatch { receipt: Uuid, peer: Option<PeerId>, key: ClaimKey },
}

/// Records every call, then forwards it to `inner`.
pub struct RecordingHandler<H> {
    inner: H,
    calls: Mutex<Vec<Call>>,
}

impl<H: BroadcastHandler> RecordingHandler<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, key: &ClaimKey) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                Call::Raw { key: k, .. } | Call::Mismatch { key: k, .. } => k == key,
                Call::Validated(message) => message.key() == *key,
            })
            .collect()
    }
}

impl<H: BroadcastHandler> BroadcastHandler for RecordingHandler<H> {
    fn raw_message(&self, envelope: &MessageWithPeerMetadata) {
        self.calls.lock().push(Call::Raw {
            receipt: envelope.receipt_id(),
            key: envelope.key(),
        });
        self.inner.raw_message(envelope);
    }

    fn validated_message(&self, message: BroadcastMessage) {
        self.calls.lock().push(Call::Validated(message.clone()));
        self.inner.validated_message(message);
    }

    fn mismatch_message(&self, envelope: MessageWithPeerMetadata) {
        self.calls.lock().push(Call::Mismatch {
            receipt: envelope.receipt_id(),
            peer: envelope.peer_id().copied(),
            key: envelope.key(),
        });
        self.inner.mismatch_message(envelope);
    }
}

/// Handler that ignores everything.
pub struct NullHandler;

impl BroadcastHandler for NullHandler {
    fn raw_message(&self, _envelope: &MessageWithPeerMetadata) {}
    fn validated_message(&self, _message: BroadcastMessage) {}
    fn mismatch_message(&self, _envelope: MessageWithPeerMetadata) {}
}

// =============================================================================
// TEST NODE
// =============================================================================

pub type NodeDispatcher = Dispatcher<InMemoryChainState, RecordingHandler<SignerHandler>>;

/// One relayer's rl-01 and rl-02 wired together over in-memory adapters.
pub struct TestNode {
    pub bus: Arc<InMemoryEventBus>,
    pub chain_state: Arc<InMemoryChainState>,
    pub submitter: Arc<InMemoryAttestationSubmitter>,
    pub signer: Arc<Signer<InMemoryAttestationSubmitter>>,
    pub handler: Arc<RecordingHandler<SignerHandler>>,
    pub dispatcher: NodeDispatcher,
}

impl TestNode {
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    /// Node requiring one confirmation on both chains.
    pub fn with_config(config: DispatchConfig) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let chain_state = Arc::new(
            InMemoryChainState::new()
                .with_confirmations(ChainId::Ethereum, 1)
                .with_confirmations(ChainId::Fury, 1),
        );
        let submitter = Arc::new(InMemoryAttestationSubmitter::new());

        let signer_config = SignerConfig {
            submit_backoff: Duration::from_millis(1),
            ..SignerConfig::default()
        };
        let attestor = AttestationSigner::from_bytes(&SIGNING_KEY, RELAYER)
            .expect("fixture key is valid");
        let signer = Signer::new(signer_config, attestor, submitter.clone())
            .with_event_publisher(bus.clone());
        let handler = Arc::new(RecordingHandler::new(
            signer.handler(Arc::new(BusAlertSink::new(bus.clone()))),
        ));
        let dispatcher = Dispatcher::new(config, chain_state.clone(), handler.clone())
            .with_event_publisher(bus.clone());

        Self {
            bus,
            chain_state,
            submitter,
            signer: Arc::new(signer),
            handler,
            dispatcher,
        }
    }

    /// Record `payload` as observed at `height` and confirm it.
    pub fn confirm(&self, payload: ClaimPayload, height: u64) {
        self.chain_state.record(payload.clone(), height);
        self.chain_state.advance(payload.source_chain(), height);
    }
}

impl Default for TestNode {
    fn default() -> Self {
        Self::new()
    }
}
