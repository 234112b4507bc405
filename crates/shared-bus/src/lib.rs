//! # Shared Bus - Processing-Event Bus
//!
//! Publish/subscribe channel for message-lifecycle notifications. The
//! delivery layer of the business application observes hand-off events
//! here instead of polling the ledger; operational tooling subscribes for
//! audit trails.
//!
//! ```text
//! ┌──────────────────┐                    ┌─────────────────────┐
//! │ Correlation (1)  │                    │ Business delivery   │
//! │                  │    publish()       │ layer               │
//! │                  │ ──────┐            │                     │
//! └──────────────────┘       │            └─────────────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐          │
//!                      │  Event Bus   │          │
//!                      │              │ ─────────┘
//!                      └──────────────┘  subscribe()
//! ```
//!
//! Publishing is fire-and-forget: a notification is advisory, the ledger
//! remains the source of truth for every unit's state.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, ProcessingEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
