//! In-memory view of both bridged chains.
//!
//! Implements `ChainStateReader` for devnet runs and tests. A claimed event
//! is known once the local tip has the required confirmations on top of the
//! height the event was recorded at. Claims for heights the local view has
//! confirmed without a recorded event are reported as not found.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rl_01_broadcast::{ChainStateReader, Observation, ReaderError};
use shared_types::{BroadcastMessage, ChainId, ClaimKey, ClaimPayload};
use tracing::debug;

#[derive(Default)]
pub struct InMemoryChainState {
    tips: RwLock<HashMap<ChainId, u64>>,
    confirmations: HashMap<ChainId, u64>,
    events: RwLock<HashMap<ClaimKey, (ClaimPayload, u64)>>,
    offline: RwLock<bool>,
}

impl InMemoryChainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the confirmation requirement for a chain.
    pub fn with_confirmations(mut self, chain: ChainId, confirmations: u64) -> Self {
        self.confirmations.insert(chain, confirmations);
        self
    }

    /// Confirmations required for `chain`. Never less than one.
    pub fn required_confirmations(&self, chain: ChainId) -> u64 {
        self.confirmations
            .get(&chain)
            .copied()
            .unwrap_or_else(|| chain.default_confirmations())
            .max(1)
    }

    pub fn tip(&self, chain: ChainId) -> u64 {
        self.tips.read().get(&chain).copied().unwrap_or(0)
    }

    /// Move the local tip forward. Returns false if `height` is not ahead.
    pub fn advance(&self, chain: ChainId, height: u64) -> bool {
        let mut tips = self.tips.write();
        let tip = tips.entry(chain).or_insert(0);
        if height <= *tip {
            return false;
        }
        *tip = height;
        debug!(chain = %chain, height, "Local tip advanced");
        true
    }

    /// Record an event as this node observed it, at `height` on its source chain.
    pub fn record(&self, event: ClaimPayload, height: u64) {
        self.events.write().insert(event.key(), (event, height));
    }

    /// Simulate an unreachable node RPC.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.write() = offline;
    }

    fn is_confirmed(&self, chain: ChainId, height: u64) -> bool {
        let needed = height.saturating_add(self.required_confirmations(chain) - 1);
        self.tip(chain) >= needed
    }
}

#[async_trait]
impl ChainStateReader for InMemoryChainState {
    async fn observe(&self, message: &BroadcastMessage) -> Result<Observation, ReaderError> {
        if *self.offline.read() {
            return Err(ReaderError::Unavailable("chain node offline".into()));
        }

        let chain = message.payload.source_chain();
        let recorded = self.events.read().get(&message.key()).cloned();

        let observation = match recorded {
            Some((event, height)) if self.is_confirmed(chain, height) => Observation::Known(event),
            Some(_) => Observation::NotYetKnown,
            None if self.is_confirmed(chain, message.observed_height) => Observation::NotFound,
            None => Observation::NotYetKnown,
        };
        Ok(observation)
    }
}
