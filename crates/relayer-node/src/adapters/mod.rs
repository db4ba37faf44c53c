//! # Adapters
//!
//! Transport implementations plugged into the broadcast subsystem's ports.

mod transport;

pub use transport::{ChannelTransport, InboundFrame, LoopbackNetwork};
