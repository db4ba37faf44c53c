//! Bech32 account address codec (BIP-173).
//!
//! Destination-chain accounts are bech32 strings with the `fury` prefix.
//! Only the original bech32 checksum constant is accepted; bech32m strings
//! fail the checksum.

use thiserror::Error;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const GENERATOR: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];
const CHECKSUM_LEN: usize = 6;
const MAX_LEN: usize = 90;

/// Bech32 decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Bech32Error {
    #[error("mixed case")]
    MixedCase,

    #[error("missing separator")]
    MissingSeparator,

    #[error("invalid length {0}")]
    InvalidLength(usize),

    #[error("invalid character {0:?}")]
    InvalidChar(char),

    #[error("expected prefix {expected}, got {actual}")]
    WrongPrefix { expected: String, actual: String },

    #[error("invalid checksum")]
    InvalidChecksum,

    #[error("invalid padding")]
    InvalidPadding,
}

fn polymod(values: impl Iterator<Item = u8>) -> u32 {
    let mut chk: u32 = 1;
    for v in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ u32::from(v);
        for (i, g) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 2 + 1);
    out.extend(bytes.iter().map(|b| b >> 5));
    out.push(0);
    out.extend(bytes.iter().map(|b| b & 0x1f));
    out
}

/// Regroups a bit stream from `from`-bit to `to`-bit words.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, Bech32Error> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let acc_mask: u32 = (1 << (from + to - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &v in data {
        acc = ((acc << from) | u32::from(v)) & acc_mask;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & maxv) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return Err(Bech32Error::InvalidPadding);
    }

    Ok(out)
}

/// Decodes `addr`, requiring the human-readable part to be `expected_hrp`.
///
/// Returns the raw address bytes.
pub fn decode(addr: &str, expected_hrp: &str) -> Result<Vec<u8>, Bech32Error> {
    if addr.len() < expected_hrp.len() + 1 + CHECKSUM_LEN || addr.len() > MAX_LEN {
        return Err(Bech32Error::InvalidLength(addr.len()));
    }

    let has_lower = addr.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = addr.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(Bech32Error::MixedCase);
    }

    let addr = addr.to_ascii_lowercase();
    let sep = addr.rfind('1').ok_or(Bech32Error::MissingSeparator)?;
    let (hrp, data) = (&addr[..sep], &addr[sep + 1..]);

    if hrp != expected_hrp {
        return Err(Bech32Error::WrongPrefix {
            expected: expected_hrp.to_string(),
            actual: hrp.to_string(),
        });
    }
    if data.len() < CHECKSUM_LEN {
        return Err(Bech32Error::InvalidLength(addr.len()));
    }

    let mut values = Vec::with_capacity(data.len());
    for c in data.chars() {
        let pos = CHARSET
            .iter()
            .position(|&x| char::from(x) == c)
            .ok_or(Bech32Error::InvalidChar(c))?;
        values.push(pos as u8);
    }

    if polymod(hrp_expand(hrp).into_iter().chain(values.iter().copied())) != 1 {
        return Err(Bech32Error::InvalidChecksum);
    }

    convert_bits(&values[..values.len() - CHECKSUM_LEN], 5, 8, false)
}

/// Encodes raw address bytes under `hrp`.
pub fn encode(hrp: &str, bytes: &[u8]) -> Result<String, Bech32Error> {
    let data = convert_bits(bytes, 8, 5, true)?;

    let mut values = hrp_expand(hrp);
    values.extend_from_slice(&data);
    values.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let pm = polymod(values.into_iter()) ^ 1;

    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(hrp);
    out.push('1');
    for d in &data {
        out.push(char::from(CHARSET[*d as usize]));
    }
    for i in 0..CHECKSUM_LEN {
        let d = (pm >> (5 * (5 - i))) & 31;
        out.push(char::from(CHARSET[d as usize]));
    }
    Ok(out)
}
