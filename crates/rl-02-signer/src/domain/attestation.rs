//! # Attestations
//!
//! A relayer's signed statement that a claim matches its own view of both
//! chains.
//!
//! ## Signing
//!
//! `digest = SHA-256(claim_key || canonical_json(message))`, signed with
//! ECDSA over secp256k1 (low-S, 64-byte `r || s`). The compressed SEC1 public
//! key travels with the signature so any party can verify it.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{
    BroadcastMessage, ClaimKey, ClaimPayload, CoinConversion, Hash, MsgBridgeEthereumToFury,
};
use std::fmt;

use super::errors::SignerError;

/// The destination-chain message an attestation vouches for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttestedMessage {
    /// Mint an Ethereum deposit on Fury.
    BridgeEthereumToFury(MsgBridgeEthereumToFury),
    /// Release a Fury coin conversion on Ethereum.
    CoinConversion(CoinConversion),
}

impl AttestedMessage {
    /// Build the message for a claim, with `relayer` as the signer of record.
    pub fn for_claim(relayer: &str, claim: &ClaimPayload) -> Self {
        match claim {
            ClaimPayload::EthereumDeposit(deposit) => {
                Self::BridgeEthereumToFury(MsgBridgeEthereumToFury::from_deposit(relayer, deposit))
            }
            ClaimPayload::CoinConversion(conversion) => Self::CoinConversion(conversion.clone()),
        }
    }

    pub fn validate_basic(&self) -> Result<(), SignerError> {
        match self {
            Self::BridgeEthereumToFury(msg) => msg.validate_basic()?,
            Self::CoinConversion(conversion) => conversion.validate_basic()?,
        }
        Ok(())
    }

    fn canonical_bytes(&self) -> Result<Vec<u8>, SignerError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// A signed attestation ready for submission.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub claim_key: ClaimKey,
    pub message: AttestedMessage,
    /// Compact `r || s`.
    pub signature: Vec<u8>,
    /// Compressed SEC1 public key of the signing relayer.
    pub public_key: Vec<u8>,
}

impl Attestation {
    /// Check the signature against the embedded public key.
    pub fn verify(&self) -> Result<(), SignerError> {
        let key = VerifyingKey::from_sec1_bytes(&self.public_key)
            .map_err(|_| SignerError::InvalidSignature)?;
        let signature =
            Signature::from_slice(&self.signature).map_err(|_| SignerError::InvalidSignature)?;
        let digest = signing_digest(&self.claim_key, &self.message)?;
        key.verify_prehash(&digest, &signature)
            .map_err(|_| SignerError::InvalidSignature)
    }

    /// True when this attestation was produced by `public_key`.
    pub fn is_signed_by(&self, public_key: &[u8]) -> bool {
        self.public_key == public_key && self.verify().is_ok()
    }
}

impl fmt::Debug for Attestation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attestation")
            .field("claim_key", &self.claim_key)
            .field("message", &self.message)
            .field("signature", &hex::encode(&self.signature))
            .field("public_key", &hex::encode(&self.public_key))
            .finish()
    }
}

/// The relayer's attestation key.
pub struct AttestationSigner {
    key: SigningKey,
    relayer: String,
}

impl AttestationSigner {
    /// Load a 32-byte secret. Zero and out-of-range scalars are refused.
    pub fn from_bytes(secret: &[u8], relayer: impl Into<String>) -> Result<Self, SignerError> {
        let key = SigningKey::from_slice(secret).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self {
            key,
            relayer: relayer.into(),
        })
    }

    /// Load a hex-encoded secret, with or without `0x`.
    pub fn from_hex(secret: &str, relayer: impl Into<String>) -> Result<Self, SignerError> {
        let trimmed = secret.strip_prefix("0x").unwrap_or(secret);
        let bytes = hex::decode(trimmed).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Self::from_bytes(&bytes, relayer)
    }

    pub fn relayer(&self) -> &str {
        &self.relayer
    }

    /// Compressed SEC1 public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    /// Compose, validate and sign the attestation for a validated claim.
    pub fn attest(&self, claim: &BroadcastMessage) -> Result<Attestation, SignerError> {
        let claim_key = claim.key();
        let message = AttestedMessage::for_claim(&self.relayer, &claim.payload);
        message.validate_basic()?;

        let digest = signing_digest(&claim_key, &message)?;
        let signature: Signature = self
            .key
            .sign_prehash(&digest)
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        let signature = signature.normalize_s().unwrap_or(signature);

        Ok(Attestation {
            claim_key,
            message,
            signature: signature.to_bytes().to_vec(),
            public_key: self.public_key(),
        })
    }
}

impl fmt::Debug for AttestationSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttestationSigner")
            .field("relayer", &self.relayer)
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

fn signing_digest(key: &ClaimKey, message: &AttestedMessage) -> Result<Hash, SignerError> {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(message.canonical_bytes()?);
    Ok(hasher.finalize().into())
}
