//! # Relayer Configuration
//!
//! Environment-driven configuration for one relayer process.
//!
//! ## Security Requirements
//!
//! - `signing_key` MUST NOT be the default zero value in production
//! - `relayer_address` must be a valid `fury` bech32 account address

use std::time::Duration;

use rl_01_broadcast::DispatchConfig;
use rl_02_signer::SignerConfig;
use shared_types::validation::validate_account_address;
use shared_types::{PeerId, ValidationError};
use thiserror::Error;

/// Complete relayer configuration.
#[derive(Debug, Clone, Default)]
pub struct RelayerConfig {
    pub network: NetworkConfig,
    pub signing: SigningConfig,
    pub dispatch: DispatchSettings,
    pub submit: SubmitSettings,
    /// Confirmation override for both chains; chain defaults when unset.
    pub confirmations: Option<u64>,
}

/// Gossip identity and peers.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub peer_id: PeerId,
    pub peers: Vec<PeerId>,
    /// Inbound queue depth per peer connection.
    pub inbound_capacity: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            peer_id: PeerId::new([0u8; 32]),
            peers: Vec::new(),
            inbound_capacity: 1024,
        }
    }
}

/// Attestation key material.
#[derive(Clone, Default)]
pub struct SigningConfig {
    /// secp256k1 secret. MUST be overridden in production.
    pub signing_key: [u8; 32],
    pub relayer_address: String,
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("signing_key", &"<redacted>")
            .field("relayer_address", &self.relayer_address)
            .finish()
    }
}

/// Pending store and sweeper tuning.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub pending_ttl: Duration,
    pub max_pending: usize,
    pub sweep_interval: Duration,
    pub max_resolution_attempts: u32,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        let dispatch = DispatchConfig::default();
        Self {
            pending_ttl: dispatch.default_ttl,
            max_pending: dispatch.max_pending,
            sweep_interval: Duration::from_millis(1000),
            max_resolution_attempts: dispatch.max_resolution_attempts,
        }
    }
}

/// Submission worker tuning.
#[derive(Debug, Clone)]
pub struct SubmitSettings {
    pub max_retries: u32,
    pub backoff: Duration,
    pub workers: usize,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: Duration::from_millis(200),
            workers: 1,
        }
    }
}

impl RelayerConfig {
    /// Load from `RELAYER_*` environment variables over defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("RELAYER_PEER_ID") {
            config.network.peer_id = parse_peer("RELAYER_PEER_ID", &value)?;
        }
        if let Some(value) = lookup("RELAYER_PEERS") {
            config.network.peers = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_peer("RELAYER_PEERS", s))
                .collect::<Result<_, _>>()?;
        }
        if let Some(value) = lookup("RELAYER_SIGNING_KEY") {
            config.signing.signing_key = parse_secret(&value)?;
        }
        if let Some(value) = lookup("RELAYER_ADDRESS") {
            config.signing.relayer_address = value.trim().to_string();
        }

        if let Some(value) = lookup("RELAYER_PENDING_TTL_SECS") {
            config.dispatch.pending_ttl = Duration::from_secs(parse_num("RELAYER_PENDING_TTL_SECS", &value)?);
        }
        if let Some(value) = lookup("RELAYER_MAX_PENDING") {
            config.dispatch.max_pending = parse_num("RELAYER_MAX_PENDING", &value)?;
        }
        if let Some(value) = lookup("RELAYER_SWEEP_INTERVAL_MS") {
            config.dispatch.sweep_interval =
                Duration::from_millis(parse_num("RELAYER_SWEEP_INTERVAL_MS", &value)?);
        }
        if let Some(value) = lookup("RELAYER_MAX_RESOLUTION_ATTEMPTS") {
            config.dispatch.max_resolution_attempts = parse_num("RELAYER_MAX_RESOLUTION_ATTEMPTS", &value)?;
        }

        if let Some(value) = lookup("RELAYER_SUBMIT_RETRIES") {
            config.submit.max_retries = parse_num("RELAYER_SUBMIT_RETRIES", &value)?;
        }
        if let Some(value) = lookup("RELAYER_SUBMIT_BACKOFF_MS") {
            config.submit.backoff = Duration::from_millis(parse_num("RELAYER_SUBMIT_BACKOFF_MS", &value)?);
        }
        if let Some(value) = lookup("RELAYER_SUBMIT_WORKERS") {
            config.submit.workers = parse_num("RELAYER_SUBMIT_WORKERS", &value)?;
        }
        if let Some(value) = lookup("RELAYER_CONFIRMATIONS") {
            config.confirmations = Some(parse_num("RELAYER_CONFIRMATIONS", &value)?);
        }

        Ok(config)
    }

    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the signing key is the default zero value
    /// - the relayer address is not a `fury` account address
    /// - a size or interval that must be positive is zero
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.signing.signing_key == [0u8; 32] {
            return Err(ConfigError::InsecureSigningKey);
        }
        validate_account_address(&self.signing.relayer_address, "relayer address")
            .map_err(ConfigError::InvalidRelayerAddress)?;

        for (name, value) in [
            ("RELAYER_PENDING_TTL_SECS", self.dispatch.pending_ttl.as_secs()),
            ("RELAYER_MAX_PENDING", self.dispatch.max_pending as u64),
            ("RELAYER_SWEEP_INTERVAL_MS", self.dispatch.sweep_interval.as_millis() as u64),
            ("RELAYER_SUBMIT_WORKERS", self.submit.workers as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    var: name,
                    reason: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            default_ttl: self.dispatch.pending_ttl,
            max_pending: self.dispatch.max_pending,
            max_resolution_attempts: self.dispatch.max_resolution_attempts,
        }
    }

    pub fn signer_config(&self) -> SignerConfig {
        SignerConfig {
            max_submit_retries: self.submit.max_retries,
            submit_backoff: self.submit.backoff,
            ..SignerConfig::default()
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error(
        "SECURITY VIOLATION: signing key is the default zero value. \
         Set the RELAYER_SIGNING_KEY environment variable."
    )]
    InsecureSigningKey,

    #[error("RELAYER_ADDRESS: {0}")]
    InvalidRelayerAddress(ValidationError),
}

fn parse_peer(var: &'static str, value: &str) -> Result<PeerId, ConfigError> {
    let trimmed = value.trim();
    PeerId::from_hex(trimmed).ok_or_else(|| {
        ConfigError::InvalidValue {
            var,
            reason: format!("expected 32 bytes of hex, got {trimmed:?}"),
        }
    })
}

fn parse_secret(value: &str) -> Result<[u8; 32], ConfigError> {
    let trimmed = value.trim();
    let bytes = hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed)).map_err(|e| {
        ConfigError::InvalidValue {
            var: "RELAYER_SIGNING_KEY",
            reason: e.to_string(),
        }
    })?;
    bytes.try_into().map_err(|_| ConfigError::InvalidValue {
        var: "RELAYER_SIGNING_KEY",
        reason: "expected 32 bytes".into(),
    })
}

fn parse_num<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        reason: e.to_string(),
    })
}
