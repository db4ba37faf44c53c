//! # Error Types
//!
//! Structural validation errors shared by claims and destination-chain
//! messages. Messages mirror the bridge module's `ValidateBasic` wording so
//! operators can correlate relayer logs with chain rejections.

use thiserror::Error;

/// Errors returned by `validate_basic`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An account address field was empty.
    #[error("empty address string is not allowed: invalid address")]
    EmptyAddress,

    /// An account address failed bech32 decoding or carries the wrong prefix.
    #[error("{field} is not a valid bech32 address ({reason}): invalid address")]
    InvalidBech32 { field: &'static str, reason: String },

    /// A hex address is not 20 bytes of hex (`0x` prefix optional).
    #[error("{field} is not a valid hex address: invalid address")]
    InvalidHexAddress { field: &'static str },

    /// Bridge amount is zero.
    #[error("amount must be positive non-zero")]
    NonPositiveAmount,

    /// Coin amount is zero.
    #[error("amount cannot be zero")]
    ZeroCoinAmount,

    /// Coin denomination does not match the denom grammar.
    #[error("invalid denom: {0}")]
    InvalidDenom(String),

    /// A transaction hash field is all zeroes.
    #[error("transaction hash must not be zero")]
    ZeroTxHash,

    /// The claim lifetime is zero or overflows its creation time.
    #[error("invalid ttl: {ttl_seconds}s from creation time {created}")]
    InvalidTtl { created: u64, ttl_seconds: u64 },

    /// The claim's creation time is ahead of the receiver's clock by more
    /// than the tolerated skew.
    #[error("creation time {created} is after latest accepted time {latest}")]
    CreatedInFuture { created: u64, latest: u64 },
}
