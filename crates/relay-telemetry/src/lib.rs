//! # Relay Telemetry
//!
//! Logging and metrics for the Fury bridge relayer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RELAYER_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `RELAYER_JSON_LOGS` | `false` | JSON log lines |
//! | `RELAYER_METRICS_PORT` | `9100` | Prometheus port |
//! | `RELAYER_NETWORK` | `devnet` | Network label |

mod config;
pub mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use logging::{peer_label, SECURITY_TARGET};
pub use metrics::{
    gather_metrics, register_metrics, ATTESTATIONS, BROADCAST_SENDS, CLAIMS_REJECTED,
    CLAIM_OUTCOMES, MISMATCHES, PENDING_ENTRIES, RAW_MESSAGES, SUBMIT_DURATION,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Register metrics, then install the tracing subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_tracing(config)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
