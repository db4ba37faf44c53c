//! # Claims
//!
//! A claim (`BroadcastMessage`) is a relayer's assertion about a bridge event
//! that peers must independently confirm before co-signing.
//!
//! ## Identity
//!
//! [`ClaimKey`] is derived from the identity fields of the event only:
//!
//! | Claim | Identity |
//! |-------|----------|
//! | Ethereum deposit | bridge `sequence` |
//! | Coin conversion | destination-chain `tx_hash` |
//!
//! Amount, receiver and observed height are excluded. Two claims with the same
//! key but different content are therefore comparable, and a disagreement with
//! local ground truth surfaces as a mismatch instead of as an unrelated claim.
//!
//! ## Wire Format
//!
//! Claims travel between relayers as JSON. Amounts and sequences are unsigned,
//! so a negative value fails to decode.

use crate::entities::{ChainId, Coin, Hash, U256};
use crate::errors::ValidationError;
use crate::msgs;
use crate::validation::{parse_hex_address, validate_hex_address};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

const DEPOSIT_KEY_TAG: &[u8] = b"fury-bridge/claim/ethereum-deposit/v1";
const CONVERSION_KEY_TAG: &[u8] = b"fury-bridge/claim/coin-conversion/v1";

/// Content-derived claim identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimKey(pub Hash);

impl ClaimKey {
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimKey({})", self.to_hex())
    }
}

/// An ERC20 deposit observed on Ethereum, to be minted on Fury.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthereumDeposit {
    pub ethereum_erc20_address: String,
    pub amount: U256,
    pub receiver: String,
    /// Bridge contract sequence. Wraps to 0 on overflow.
    pub sequence: U256,
}

impl EthereumDeposit {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_hex_address(&self.ethereum_erc20_address, "ethereum ERC20 address")?;
        validate_hex_address(&self.receiver, "receiver address")?;
        if self.amount.is_zero() {
            return Err(ValidationError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Field equality with hex addresses compared by value.
    pub fn agrees_with(&self, other: &EthereumDeposit) -> bool {
        self.sequence == other.sequence
            && self.amount == other.amount
            && same_hex_address(&self.ethereum_erc20_address, &other.ethereum_erc20_address)
            && same_hex_address(&self.receiver, &other.receiver)
    }
}

/// A `ConvertCoinToERC20` executed on Fury, to be released on Ethereum.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinConversion {
    pub tx_hash: Hash,
    pub initiator: String,
    pub receiver: String,
    pub amount: Coin,
}

impl CoinConversion {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.tx_hash == [0u8; 32] {
            return Err(ValidationError::ZeroTxHash);
        }
        msgs::validate_conversion(&self.initiator, &self.receiver, &self.amount)
    }

    pub fn agrees_with(&self, other: &CoinConversion) -> bool {
        self.tx_hash == other.tx_hash
            && self.amount == other.amount
            && self.initiator.eq_ignore_ascii_case(&other.initiator)
            && same_hex_address(&self.receiver, &other.receiver)
    }
}

fn same_hex_address(a: &str, b: &str) -> bool {
    match (parse_hex_address(a), parse_hex_address(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// The event a claim asserts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaimPayload {
    EthereumDeposit(EthereumDeposit),
    CoinConversion(CoinConversion),
}

impl ClaimPayload {
    /// Chain whose state is ground truth for this claim.
    pub fn source_chain(&self) -> ChainId {
        match self {
            ClaimPayload::EthereumDeposit(_) => ChainId::Ethereum,
            ClaimPayload::CoinConversion(_) => ChainId::Fury,
        }
    }

    pub fn key(&self) -> ClaimKey {
        let mut hasher = Sha256::new();
        match self {
            ClaimPayload::EthereumDeposit(d) => {
                let mut seq = [0u8; 32];
                d.sequence.to_big_endian(&mut seq);
                hasher.update(DEPOSIT_KEY_TAG);
                hasher.update(seq);
            }
            ClaimPayload::CoinConversion(c) => {
                hasher.update(CONVERSION_KEY_TAG);
                hasher.update(c.tx_hash);
            }
        }
        ClaimKey(hasher.finalize().into())
    }

    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        match self {
            ClaimPayload::EthereumDeposit(d) => d.validate_basic(),
            ClaimPayload::CoinConversion(c) => c.validate_basic(),
        }
    }

    /// True when `derived` describes the same event with the same content.
    ///
    /// Claims of different kinds never agree.
    pub fn agrees_with(&self, derived: &ClaimPayload) -> bool {
        match (self, derived) {
            (ClaimPayload::EthereumDeposit(a), ClaimPayload::EthereumDeposit(b)) => a.agrees_with(b),
            (ClaimPayload::CoinConversion(a), ClaimPayload::CoinConversion(b)) => a.agrees_with(b),
            _ => false,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClaimPayload::EthereumDeposit(_) => "ethereum_deposit",
            ClaimPayload::CoinConversion(_) => "coin_conversion",
        }
    }
}

/// A claim as gossiped between relayers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    pub payload: ClaimPayload,
    /// Source-chain height at which the sender observed the event.
    pub observed_height: u64,
    /// Unix seconds at which the sender created the claim.
    pub created: u64,
    /// Sender-declared lifetime.
    pub ttl_seconds: u64,
}

impl BroadcastMessage {
    pub fn new(payload: ClaimPayload, observed_height: u64, created: u64, ttl_seconds: u64) -> Self {
        Self {
            payload,
            observed_height,
            created,
            ttl_seconds,
        }
    }

    pub fn key(&self) -> ClaimKey {
        self.payload.key()
    }

    /// Unix second after which the sender no longer considers the claim live.
    pub fn expires_at(&self) -> Option<u64> {
        self.created.checked_add(self.ttl_seconds)
    }

    /// Structural checks only. Never consults chain state.
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.ttl_seconds == 0 || self.expires_at().is_none() {
            return Err(ValidationError::InvalidTtl {
                created: self.created,
                ttl_seconds: self.ttl_seconds,
            });
        }
        self.payload.validate_basic()
    }

    /// Rejects a claim created more than `max_skew_seconds` after `unix_now`.
    pub fn validate_created(&self, unix_now: u64, max_skew_seconds: u64) -> Result<(), ValidationError> {
        let latest = unix_now.saturating_add(max_skew_seconds);
        if self.created > latest {
            return Err(ValidationError::CreatedInFuture {
                created: self.created,
                latest,
            });
        }
        Ok(())
    }

    pub fn to_wire(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_wire(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
