//! # Fury Bridge Relayer Node
//!
//! Wires the broadcast (rl-01) and signer (rl-02) subsystems into one
//! relayer process.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the assembled subsystem graph
//! - `adapters/` - peer transport implementations
//! - `runtime` - background tasks and lifecycle
//!
//! ## Claim Flow
//!
//! ```text
//! transport ──frame──→ inbound loop ──→ Dispatcher ──validated──→ Signer queue
//!                                          │   ↑                        │
//!                                  pending │   │ LocalStateAdvanced      ↓
//!                                          ↓   │                  submission
//!                                    PendingStore ←── sweeper       workers
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load configuration from `RELAYER_*` variables
//! 3. Validate signing key and relayer address
//! 4. Build subsystems in dependency order
//! 5. Spawn background tasks, run until Ctrl-C

pub mod adapters;
pub mod container;
pub mod runtime;

pub use adapters::{ChannelTransport, LoopbackNetwork};
pub use container::{ConfigError, RelayerConfig, SubsystemContainer};
pub use runtime::RelayerRuntime;
