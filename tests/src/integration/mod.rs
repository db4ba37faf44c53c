//! # Integration Tests
//!
//! Cross-crate flows: a single wired relayer (`scenarios`, `properties`) and
//! several runtimes over the loopback network (`network`).

pub mod network;
pub mod properties;
