//! # Domain Layer for the Signer
//!
//! - **attestation**: attested messages, signing and verification
//! - **errors**: `SignerError`, `SubmitError`
//! - **value_objects**: `SignerConfig`, `MismatchAlert`, `AttestationOutcome`

mod attestation;
mod errors;
mod value_objects;

pub use attestation::*;
pub use errors::*;
pub use value_objects::*;
