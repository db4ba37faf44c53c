//! Structured logging helpers.
//!
//! Every relay log line carries the same core fields so log pipelines can
//! join dispatch, signer and broadcast output on them:
//! - `subsystem`: emitting component (dispatcher, signer, broadcaster)
//! - `claim_key`: short claim identity
//! - `peer_id`: short sending or target peer identity

/// Log target for security-relevant events (mismatches).
///
/// Kept separate from module targets so operators can route it to alerting
/// with a single `EnvFilter` directive.
pub const SECURITY_TARGET: &str = "relay::security";

/// Log a claim-related event with standard fields.
#[macro_export]
macro_rules! log_claim_event {
    ($level:ident, $subsystem:expr, $msg:expr, $claim_key:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            claim_key = %$claim_key,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a peer-related event with standard fields.
#[macro_export]
macro_rules! log_peer_event {
    ($level:ident, $subsystem:expr, $msg:expr, $peer_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            peer_id = %$peer_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Formats an optional peer for log fields. Local claims have no sender.
pub fn peer_label<T: std::fmt::Display>(peer: Option<&T>) -> String {
    peer.map_or_else(|| "local".to_string(), |p| p.to_string())
}
