//! # Signer Subsystem (rl-02)
//!
//! Turns claims the dispatcher validated into signed attestations on the
//! destination chain, and turns mismatches into security alerts.
//!
//! ## Architecture Role
//!
//! ```text
//! [Dispatcher (rl-01)] ──validated──→ SignerHandler ──queue──→ worker(s)
//!                      ──mismatch───→ SignerHandler ──→ SecurityAlertSink
//!
//! worker: is_attested? ──no──→ sign (secp256k1) ──→ AttestationSubmitter
//!                                                   (retry with backoff)
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! rl-02-signer/
//! ├── domain/      # Attestation, AttestationSigner, SignerConfig, errors
//! ├── ports/       # AttestationSubmitter, SecurityAlertSink
//! ├── adapters/    # In-memory chain view and submitter, alert sinks
//! ├── handler.rs   # BroadcastHandler implementation
//! └── signer.rs    # Submission workers
//! ```

pub mod adapters;
pub mod domain;
pub mod handler;
pub mod ports;
pub mod signer;

pub use adapters::{BusAlertSink, InMemoryAttestationSubmitter, InMemoryChainState, TracingAlertSink};
pub use domain::*;
pub use handler::SignerHandler;
pub use ports::{AttestationSubmitter, SecurityAlertSink, SubmitOutcome};
pub use signer::Signer;
