//! # Ports
//!
//! The signer's inbound API is `rl_01_broadcast::BroadcastHandler`; only
//! outbound ports live here.

pub mod outbound;

pub use outbound::{AttestationSubmitter, SecurityAlertSink, SubmitOutcome};
