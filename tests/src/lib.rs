//! # Fury Relayer Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Claim builders, recording handler, test node
//! └── integration/      # Cross-subsystem flows
//!     ├── scenarios.rs  # Deposit #42-#45 end to end
//!     ├── properties.rs # Dispatch and store guarantees
//!     └── network.rs    # Relayer runtimes over the loopback network
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p relay-tests
//!
//! # By category
//! cargo test -p relay-tests integration::scenarios::
//! cargo test -p relay-tests integration::network::
//!
//! # Benchmarks
//! cargo bench -p relay-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
