//! # Shared Bus - Event Bus for Relayer Subsystems
//!
//! In-process choreography between the dispatcher, the signer and the
//! runtime's chain watchers.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Chain watcher│                    │  Dispatcher  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! - `LocalStateAdvanced` wakes the dispatcher to re-offer pending claims.
//! - `MismatchDetected` is published on the `Security` topic so operators can
//!   attach alerting without touching the signer.
//! - `CriticalError` is routed to the dead letter queue topic.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{
    EventFilter, EventTopic, RelayEvent, BROADCAST_SUBSYSTEM, RUNTIME_SUBSYSTEM,
    SIGNER_SUBSYSTEM,
};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
