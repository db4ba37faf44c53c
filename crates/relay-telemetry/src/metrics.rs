//! Prometheus metrics for the relay pipeline.
//!
//! All metrics follow the naming convention: `relay_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: claims seen, outcomes, rejects, mismatches
//! - **Gauge**: pending store size
//! - **Histogram**: attestation submission latency

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // DISPATCH METRICS (rl-01)
    // =========================================================================

    /// Every inbound envelope that reached the handler's raw entry point
    pub static ref RAW_MESSAGES: Counter = Counter::new(
        "relay_raw_messages_total",
        "Total inbound claim envelopes observed"
    ).expect("metric creation failed");

    /// Adjudication outcomes
    pub static ref CLAIM_OUTCOMES: CounterVec = CounterVec::new(
        Opts::new("relay_claims_total", "Claim adjudication outcomes"),
        &["outcome"]  // outcome: validated/mismatched/pending/rejected
    ).expect("metric creation failed");

    /// Rejects by reason
    pub static ref CLAIMS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("relay_claims_rejected_total", "Rejected claims by reason"),
        &["reason"]  // reason: undecodable/structural/stale/evicted/attempts_exhausted
    ).expect("metric creation failed");

    /// Current pending store size
    pub static ref PENDING_ENTRIES: Gauge = Gauge::new(
        "relay_pending_entries",
        "Claims waiting for local ground truth"
    ).expect("metric creation failed");

    /// Outbound sends per target
    pub static ref BROADCAST_SENDS: CounterVec = CounterVec::new(
        Opts::new("relay_broadcast_sends_total", "Outbound claim sends per target"),
        &["result"]  // result: delivered/failed
    ).expect("metric creation failed");

    // =========================================================================
    // SIGNER METRICS (rl-02)
    // =========================================================================

    /// Attestation submission outcomes
    pub static ref ATTESTATIONS: CounterVec = CounterVec::new(
        Opts::new("relay_attestations_total", "Attestation submission outcomes"),
        &["outcome"]  // outcome: submitted/already_satisfied/failed/skipped/dropped
    ).expect("metric creation failed");

    /// Peer claims conflicting with local ground truth (alerting)
    pub static ref MISMATCHES: Counter = Counter::new(
        "relay_mismatches_total",
        "Peer claims that disagreed with local ground truth"
    ).expect("metric creation failed");

    /// Attestation submission latency
    pub static ref SUBMIT_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "relay_attestation_submit_duration_seconds",
            "Time spent submitting an attestation, retries included"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Dispatch
        Box::new(RAW_MESSAGES.clone()),
        Box::new(CLAIM_OUTCOMES.clone()),
        Box::new(CLAIMS_REJECTED.clone()),
        Box::new(PENDING_ENTRIES.clone()),
        Box::new(BROADCAST_SENDS.clone()),
        // Signer
        Box::new(ATTESTATIONS.clone()),
        Box::new(MISMATCHES.clone()),
        Box::new(SUBMIT_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
