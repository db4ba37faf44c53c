//! Field-level structural checks used by `validate_basic`.

use crate::bech32;
use crate::entities::{EthAddress, FURY_BECH32_PREFIX};
use crate::errors::ValidationError;

/// Maximum raw length of a destination-chain account address.
const MAX_ACCOUNT_ADDRESS_LEN: usize = 255;

/// Parses a 20-byte hex address, with or without `0x` prefix.
///
/// Checksum casing is not enforced.
pub fn parse_hex_address(s: &str) -> Option<EthAddress> {
    let raw = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if raw.len() != 40 {
        return None;
    }
    let bytes = hex::decode(raw).ok()?;
    bytes.try_into().ok()
}

/// Requires `s` to be a 20-byte hex address.
pub fn validate_hex_address(s: &str, field: &'static str) -> Result<EthAddress, ValidationError> {
    parse_hex_address(s).ok_or(ValidationError::InvalidHexAddress { field })
}

/// Requires `s` to be a non-empty `fury` bech32 account address.
pub fn validate_account_address(s: &str, field: &'static str) -> Result<Vec<u8>, ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::EmptyAddress);
    }

    let bytes = bech32::decode(s, FURY_BECH32_PREFIX).map_err(|e| {
        ValidationError::InvalidBech32 {
            field,
            reason: e.to_string(),
        }
    })?;

    if bytes.is_empty() || bytes.len() > MAX_ACCOUNT_ADDRESS_LEN {
        return Err(ValidationError::InvalidBech32 {
            field,
            reason: format!("address length {} out of range", bytes.len()),
        });
    }
    Ok(bytes)
}

/// Requires `denom` to match `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), ValidationError> {
    let mut chars = denom.chars();
    let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'));

    if !first_ok || !rest_ok || !(3..=128).contains(&denom.len()) {
        return Err(ValidationError::InvalidDenom(denom.to_string()));
    }
    Ok(())
}
