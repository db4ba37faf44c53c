//! Hexagonal ports for the broadcast subsystem.

pub mod inbound;
pub mod outbound;
