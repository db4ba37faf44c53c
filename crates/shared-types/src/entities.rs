//! # Core Domain Entities
//!
//! Primitive identifiers and value types used across the relayer.
//!
//! - [`PeerId`]: 32-byte relayer peer identity on the gossip network
//! - [`ChainId`]: chains the bridge observes
//! - [`Coin`]: a destination-chain denomination and amount

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for amounts and bridge sequences.
pub use primitive_types::U256;

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type EthAddress = [u8; 20];

/// Human-readable prefix of destination-chain account addresses.
pub const FURY_BECH32_PREFIX: &str = "fury";

/// Peer identifier for relayer gossip.
///
/// Derived from the peer's transport key. Used to attribute inbound claims
/// to their sender and to address outbound broadcasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(pub [u8; 32]);

impl PeerId {
    /// Creates a new peer ID from a 32-byte array.
    pub fn new(id: [u8; 32]) -> Self {
        Self(id)
    }

    /// Parses a peer ID from a 64 character hex string (optional `0x`).
    pub fn from_hex(s: &str) -> Option<Self> {
        let raw = s.trim().trim_start_matches("0x");
        let bytes = hex::decode(raw).ok()?;
        let id: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(id))
    }

    /// Full hex encoding of the identifier.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PeerId {
    // Short form for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..6]))
    }
}

/// Chains observed by the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    /// Ethereum mainnet (source of ERC20 deposits).
    Ethereum,
    /// The Fury destination chain.
    Fury,
}

impl ChainId {
    /// Default confirmations before an event at a given height counts as
    /// locally known.
    pub fn default_confirmations(&self) -> u64 {
        match self {
            ChainId::Ethereum => 12,
            ChainId::Fury => 1,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Ethereum => write!(f, "ethereum"),
            ChainId::Fury => write!(f, "fury"),
        }
    }
}

/// A destination-chain coin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: U256,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: U256) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}
