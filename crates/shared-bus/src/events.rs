//! Processing events.
//!
//! Defines all notifications that flow through the shared bus. Every event
//! names the unit it is about; payload content never travels on the bus.

use serde::{Deserialize, Serialize};
use shared_types::{MessageId, Mpc, ProcessingState, UnitKind};

/// All notifications that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProcessingEvent {
    // =========================================================================
    // LEDGER
    // =========================================================================
    /// A message unit entered the ledger.
    UnitRegistered {
        /// The unit's message id.
        id: MessageId,
        /// Variant of the unit.
        kind: UnitKind,
        /// Initial processing state.
        state: ProcessingState,
    },

    // =========================================================================
    // SUBSYSTEM 1: DELIVERY CORRELATION
    // =========================================================================
    /// A sent unit completed its exchange obligations.
    MessageDelivered {
        /// The delivered unit's message id.
        id: MessageId,
    },

    /// A unit failed permanently.
    MessageFailed {
        /// The failed unit's message id.
        id: MessageId,
        /// Human-readable failure reason.
        reason: String,
    },

    /// A transmission attempt failed; the unit is eligible for retry.
    TransportFailed {
        /// The affected unit's message id.
        id: MessageId,
    },

    /// A received signal is queued for hand-off to the business
    /// application.
    ReadyForDelivery {
        /// The signal's message id.
        id: MessageId,
        /// Receipt or ErrorMessage.
        kind: UnitKind,
        /// The unit the signal refers to, when resolvable.
        refers_to: Option<MessageId>,
    },

    // =========================================================================
    // SUBSYSTEM 2: PULL RESOLUTION
    // =========================================================================
    /// A waiting message was claimed by a Pull Request.
    PullClaimed {
        /// The claimed UserMessage id.
        id: MessageId,
        /// Channel it was claimed from.
        mpc: Mpc,
    },

    // =========================================================================
    // SUBSYSTEM 3: ERROR REPORTING
    // =========================================================================
    /// A generated error was classified as not reportable; it was logged
    /// and closed, never transmitted.
    ErrorSuppressed {
        /// The suppressed error's message id.
        id: MessageId,
        /// Why no destination could be determined.
        reason: String,
    },
}

impl ProcessingEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::UnitRegistered { .. } => EventTopic::Ledger,
            Self::MessageDelivered { .. }
            | Self::MessageFailed { .. }
            | Self::TransportFailed { .. }
            | Self::ReadyForDelivery { .. } => EventTopic::Delivery,
            Self::PullClaimed { .. } => EventTopic::PullResolution,
            Self::ErrorSuppressed { .. } => EventTopic::ErrorReporting,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::UnitRegistered { .. } => 0,
            Self::MessageDelivered { .. }
            | Self::MessageFailed { .. }
            | Self::TransportFailed { .. }
            | Self::ReadyForDelivery { .. } => 1,
            Self::PullClaimed { .. } => 2,
            Self::ErrorSuppressed { .. } => 3,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Ledger registrations (shared infrastructure).
    Ledger,
    /// Subsystem 1 events: delivery outcomes and hand-off.
    Delivery,
    /// Subsystem 2 events.
    PullResolution,
    /// Subsystem 3 events.
    ErrorReporting,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &ProcessingEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
