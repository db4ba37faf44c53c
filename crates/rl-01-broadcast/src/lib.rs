//! # Claim Broadcast Subsystem (rl-01)
//!
//! Gossips bridge claims between relayers and adjudicates the claims other
//! relayers send against this node's own view of both chains.
//!
//! ## Architecture Role
//!
//! ```text
//! [Observer] ──claim──→ [Broadcaster] ──hooks──→ PeerTransport ──→ peers
//!
//! peers ──bytes──→ [Dispatcher] ──raw──────→ BroadcastHandler (always)
//!                       │       ──validated─→ BroadcastHandler ──→ [Signer (rl-02)]
//!                       │       ──mismatch──→ BroadcastHandler ──→ security alert
//!                       ↓
//!                 [PendingStore] ←── local progress / sweep
//! ```
//!
//! ## Guarantees
//!
//! - `raw_message` runs first and exactly once per envelope
//! - at most one of `validated_message` / `mismatch_message` per envelope
//! - a pending claim ends validated, mismatched or stale, never two of these
//! - nothing is retried by the broadcaster; failures surface per peer

pub mod broadcaster;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod ports;

pub use broadcaster::{
    BroadcastReport, BroadcastTarget, Broadcaster, BroadcasterHook, NoopBroadcasterHook,
};
pub use dispatcher::Dispatcher;
pub use domain::*;
pub use errors::{BroadcastError, ReaderError, TransportError};
pub use ports::inbound::{BroadcastHandler, ClaimReceiver};
pub use ports::outbound::{ChainStateReader, Observation, PeerTransport};
