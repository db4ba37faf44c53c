//! # Subsystem Container
//!
//! Builds the relayer's subsystem graph from configuration.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Event bus, chain view, attestation submitter
//! Level 1: Signer (rl-02): key, submission queue, alert sink
//! Level 2: Dispatcher (rl-01) with the signer as its handler
//! Level 3: Broadcaster (rl-01) over the peer transport
//! ```

use std::sync::Arc;

use rl_01_broadcast::{Broadcaster, Dispatcher};
use rl_02_signer::{
    AttestationSigner, BusAlertSink, InMemoryAttestationSubmitter, InMemoryChainState, Signer,
    SignerError, SignerHandler,
};
use shared_bus::InMemoryEventBus;
use shared_types::ChainId;
use tracing::info;

use crate::adapters::ChannelTransport;
use crate::container::config::RelayerConfig;

/// The dispatcher as wired in a relayer.
pub type RelayDispatcher = Dispatcher<InMemoryChainState, SignerHandler>;

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    pub config: RelayerConfig,

    // =========================================================================
    // LEVEL 0: Shared infrastructure and chain access
    // =========================================================================
    pub event_bus: Arc<InMemoryEventBus>,
    pub chain_state: Arc<InMemoryChainState>,
    pub submitter: Arc<InMemoryAttestationSubmitter>,

    // =========================================================================
    // LEVEL 1-3: Subsystems
    // =========================================================================
    pub signer: Arc<Signer<InMemoryAttestationSubmitter>>,
    pub dispatcher: Arc<RelayDispatcher>,
    pub broadcaster: Arc<Broadcaster<ChannelTransport>>,
}

impl SubsystemContainer {
    pub fn new(config: RelayerConfig, transport: ChannelTransport) -> Result<Self, SignerError> {
        info!("Initializing relayer subsystems");
        let event_bus = Arc::new(InMemoryEventBus::new());

        let mut chain_state = InMemoryChainState::new();
        if let Some(confirmations) = config.confirmations {
            chain_state = chain_state
                .with_confirmations(ChainId::Ethereum, confirmations)
                .with_confirmations(ChainId::Fury, confirmations);
        }
        let chain_state = Arc::new(chain_state);
        let submitter = Arc::new(InMemoryAttestationSubmitter::new());

        let attestor = AttestationSigner::from_bytes(
            &config.signing.signing_key,
            config.signing.relayer_address.clone(),
        )?;
        let signer = Signer::new(config.signer_config(), attestor, submitter.clone())
            .with_event_publisher(event_bus.clone());
        let handler = signer.handler(Arc::new(BusAlertSink::new(event_bus.clone())));
        info!(public_key = %hex::encode(signer.public_key()), "[rl-02] Signer ready");

        let dispatcher = Dispatcher::new(config.dispatch_config(), chain_state.clone(), Arc::new(handler))
            .with_event_publisher(event_bus.clone());
        info!("[rl-01] Dispatcher ready");

        let broadcaster = Broadcaster::new(Arc::new(transport));
        info!(peer_id = %broadcaster.local_peer_id(), "[rl-01] Broadcaster ready");

        Ok(Self {
            config,
            event_bus,
            chain_state,
            submitter,
            signer: Arc::new(signer),
            dispatcher: Arc::new(dispatcher),
            broadcaster: Arc::new(broadcaster),
        })
    }
}
