//! Value objects for dispatch configuration.

use std::time::Duration;

/// Dispatcher and pending store configuration.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Longest a claim may wait for ground truth, whatever the sender declares.
    pub default_ttl: Duration,
    /// Pending store capacity.
    pub max_pending: usize,
    /// Unresolved re-offers allowed before a pending claim is dropped.
    pub max_resolution_attempts: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            max_pending: 10_000,
            max_resolution_attempts: 64,
        }
    }
}
