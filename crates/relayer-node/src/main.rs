//! Relayer node entry point.

use anyhow::{Context, Result};
use relay_telemetry::{init_telemetry, TelemetryConfig};
use relayer_node::{LoopbackNetwork, RelayerConfig, RelayerRuntime};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("Failed to initialize telemetry")?;
    info!(
        service = %telemetry.full_service_name(),
        metrics_port = telemetry.metrics_port,
        "Telemetry initialized"
    );

    let config = RelayerConfig::from_env().context("Invalid relayer configuration")?;
    config
        .validate_for_production()
        .context("Relayer configuration failed production checks")?;

    // Devnet transport; a networked transport plugs into the same port.
    let network = LoopbackNetwork::new();
    let runtime = RelayerRuntime::on_network(config, &network)?;
    runtime.start()?;

    info!("Relayer is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
