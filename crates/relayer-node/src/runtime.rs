//! # Relayer Runtime
//!
//! Owns the subsystem container and the background tasks:
//!
//! - inbound loop: transport frames into `Dispatcher::handle_inbound`
//! - sweeper: `Dispatcher::sweep_expired` on a fixed interval
//! - progress listener: `LocalStateAdvanced` events into
//!   `Dispatcher::on_local_progress` for the chain that advanced
//! - submission workers: `Signer::run_worker`
//!
//! All tasks stop on the shared watch channel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rl_01_broadcast::{BroadcastReport, BroadcastTarget, ClaimReceiver};
use shared_bus::{EventFilter, EventPublisher, EventTopic, RelayEvent};
use shared_types::{BroadcastMessage, ChainId};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::adapters::{ChannelTransport, InboundFrame, LoopbackNetwork};
use crate::container::{RelayDispatcher, RelayerConfig, SubsystemContainer};

/// The relayer runtime orchestrating all subsystems.
pub struct RelayerRuntime {
    container: Arc<SubsystemContainer>,
    inbound: Mutex<Option<mpsc::Receiver<InboundFrame>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl RelayerRuntime {
    /// Build a runtime whose transport and inbound queue are already set up.
    pub fn new(
        config: RelayerConfig,
        transport: ChannelTransport,
        inbound: mpsc::Receiver<InboundFrame>,
    ) -> Result<Self> {
        let container =
            SubsystemContainer::new(config, transport).context("Failed to build subsystems")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            container: Arc::new(container),
            inbound: Mutex::new(Some(inbound)),
            tasks: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Join `network` under the configured peer id and build a runtime.
    pub fn on_network(config: RelayerConfig, network: &LoopbackNetwork) -> Result<Self> {
        let (transport, inbound) =
            network.join(config.network.peer_id, config.network.inbound_capacity);
        Self::new(config, transport, inbound)
    }

    pub fn container(&self) -> &Arc<SubsystemContainer> {
        &self.container
    }

    pub fn dispatcher(&self) -> &Arc<RelayDispatcher> {
        &self.container.dispatcher
    }

    /// Spawn the background tasks. Calling twice is an error.
    pub fn start(&self) -> Result<()> {
        let inbound = self
            .inbound
            .lock()
            .take()
            .context("Relayer runtime already started")?;

        let config = &self.container.config;
        info!("===========================================");
        info!("  Fury Bridge Relayer v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(peer_id = %config.network.peer_id, peers = config.network.peers.len(), "Gossip identity");

        let mut tasks = self.tasks.lock();
        tasks.push(self.spawn_inbound_loop(inbound));
        tasks.push(self.spawn_sweeper(config.dispatch.sweep_interval));
        tasks.push(self.spawn_progress_listener());
        for worker_id in 0..config.submit.workers.max(1) {
            tasks.push(tokio::spawn(
                self.container
                    .signer
                    .clone()
                    .run_worker(worker_id, self.shutdown_rx.clone()),
            ));
        }

        info!(tasks = tasks.len(), "Relayer running");
        Ok(())
    }

    /// Gossip a locally observed claim to every connected peer.
    pub async fn broadcast(&self, claim: &BroadcastMessage) -> Result<BroadcastReport> {
        let report = self
            .container
            .broadcaster
            .send(&BroadcastTarget::All, claim)
            .await
            .context("Failed to broadcast claim")?;
        if !report.is_complete() {
            warn!(
                claim_key = %claim.key(),
                failed = report.failed.len(),
                "Claim did not reach every peer"
            );
        }
        Ok(report)
    }

    /// Move this node's view of `chain` forward and notify the dispatcher.
    pub async fn advance_local_state(&self, chain: ChainId, height: u64) {
        if self.container.chain_state.advance(chain, height) {
            self.container
                .event_bus
                .publish(RelayEvent::LocalStateAdvanced { chain, height })
                .await;
        }
    }

    /// Signal shutdown and wait for every task to finish.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            match tokio::time::timeout(Duration::from_secs(5), task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "Relayer task panicked"),
                Err(_) => warn!("Relayer task did not stop in time"),
            }
        }
        info!("Shutdown complete");
    }

    fn spawn_inbound_loop(&self, mut inbound: mpsc::Receiver<InboundFrame>) -> JoinHandle<()> {
        let dispatcher = self.container.dispatcher.clone();
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    frame = inbound.recv() => match frame {
                        Some((peer, payload)) => {
                            let outcome = dispatcher.handle_inbound(peer, payload).await;
                            debug!(peer_id = %peer, outcome = outcome.label(), "Inbound claim handled");
                        }
                        None => {
                            warn!("Inbound transport closed");
                            break;
                        }
                    },
                }
            }
            info!("[rl-01] Inbound loop stopped");
        })
    }

    fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let dispatcher = self.container.dispatcher.clone();
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = interval.tick() => {
                        dispatcher.sweep_expired(Instant::now());
                    }
                }
            }
            info!("[rl-01] Sweeper stopped");
        })
    }

    fn spawn_progress_listener(&self) -> JoinHandle<()> {
        let dispatcher = self.container.dispatcher.clone();
        let mut progress = self
            .container
            .event_bus
            .event_stream(EventFilter::topics(vec![EventTopic::LocalState]));
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    event = progress.next() => match event {
                        Some(RelayEvent::LocalStateAdvanced { chain, height }) => {
                            let outcomes = dispatcher.on_local_progress(chain).await;
                            debug!(chain = %chain, height, reoffered = outcomes.len(), "Pending claims re-offered");
                        }
                        Some(_) => {}
                        None => break,
                    },
                }
            }
            info!("[rl-01] Progress listener stopped");
        })
    }
}
