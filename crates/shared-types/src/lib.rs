//! # Shared Types Crate
//!
//! Claim data model shared by every relayer component.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: claims, peer identities and destination-chain
//!   messages are defined once here and consumed by the broadcast and signer
//!   subsystems.
//! - **Content-derived identity**: a claim's [`ClaimKey`] depends only on the
//!   identity fields of the event, never on transport framing or on the
//!   disputed content (amount, receiver, height).
//! - **Structural validation is pure**: `validate_basic` never touches chain
//!   state or the network.

pub mod bech32;
pub mod claims;
pub mod entities;
pub mod errors;
pub mod msgs;
pub mod validation;

pub use claims::{BroadcastMessage, ClaimKey, ClaimPayload, CoinConversion, EthereumDeposit};
pub use entities::*;
pub use errors::*;
pub use msgs::{MsgBridgeEthereumToFury, MsgConvertCoinToErc20};
