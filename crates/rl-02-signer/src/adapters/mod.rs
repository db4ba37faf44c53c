//! # Adapters
//!
//! In-memory chain view and submitter for devnet and tests, plus the two
//! security alert sinks.

mod alert_sink;
mod chain_state;
mod submitter;

pub use alert_sink::{BusAlertSink, TracingAlertSink};
pub use chain_state::InMemoryChainState;
pub use submitter::InMemoryAttestationSubmitter;
