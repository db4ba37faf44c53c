//! # Relayer Container
//!
//! Configuration and the assembled subsystem graph for one relayer.

pub mod config;
pub mod subsystems;

pub use config::{
    ConfigError, DispatchSettings, NetworkConfig, RelayerConfig, SigningConfig, SubmitSettings,
};
pub use subsystems::{RelayDispatcher, SubsystemContainer};
