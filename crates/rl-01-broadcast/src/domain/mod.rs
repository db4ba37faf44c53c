//! # Domain Layer for Claim Dispatch
//!
//! Pure logic with no I/O dependencies.
//!
//! ## Contents
//!
//! - **envelope**: `MessageWithPeerMetadata` and deadline computation
//! - **pending_store**: claims waiting for local ground truth
//! - **classification**: adjudication outcomes and reject reasons
//! - **value_objects**: `DispatchConfig`

mod classification;
mod envelope;
mod pending_store;
mod value_objects;

pub use classification::*;
pub use envelope::*;
pub use pending_store::*;
pub use value_objects::*;
