//! Processing states and the append-only state records.
//!
//! The current state of a unit is always the last record of its sequence;
//! sequence numbers increase by exactly one per append and are the basis
//! for optimistic concurrency in the ledger.

use serde::{Deserialize, Serialize};

use crate::entities::{MessageId, MessageUnit, Timestamp};

/// Lifecycle state of a message unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingState {
    /// Unit exists but has not entered the pipeline.
    Created,
    /// Submitted by the business application.
    Submitted,
    /// Being worked on by a pipeline stage.
    Processing,
    /// Waiting for a partner's Pull Request to claim it.
    AwaitingPull,
    /// Queued for transmission in a future outgoing message.
    ReadyToPush,
    /// Included in a message whose transmission is in progress.
    Sending,
    /// Transmitted; waiting for the partner's Receipt.
    AwaitingReceipt,
    /// The transmission attempt failed; eligible for retry.
    TransportFailure,
    /// Successfully handed to the partner.
    Delivered,
    /// Queued for hand-off to the business application.
    ReadyForDelivery,
    /// A recoverable problem was recorded.
    Warning,
    /// Processing failed permanently.
    Failure,
    /// Processing completed; nothing further will happen to this unit.
    Done,
}

impl ProcessingState {
    /// True for states after which no further transition occurs.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Failure | Self::Done)
    }

    /// True for states counting as a failed outcome. `TransportFailure` is
    /// not terminal (the send may be retried) but it is not a success.
    pub fn is_failure_class(self) -> bool {
        matches!(self, Self::Failure | Self::TransportFailure)
    }
}

impl std::fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One entry of a unit's append-only state sequence.
///
/// Records are immutable once appended; "undoing" a transition is expressed
/// as a later transition, never as removal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// The state entered.
    pub state: ProcessingState,
    /// When the transition happened (ms).
    pub entered_at: Timestamp,
    /// Optional free-text transition description.
    pub description: Option<String>,
    /// Per-unit sequence number, starting at 0.
    pub seq: u32,
}

impl StateRecord {
    /// Creates the initial record of a sequence (seq 0).
    pub fn initial(state: ProcessingState, entered_at: Timestamp) -> Self {
        Self {
            state,
            entered_at,
            description: None,
            seq: 0,
        }
    }

    /// Creates the record following `previous_seq`.
    pub fn following(
        previous_seq: u32,
        state: ProcessingState,
        entered_at: Timestamp,
        description: Option<String>,
    ) -> Self {
        Self {
            state,
            entered_at,
            description,
            seq: previous_seq + 1,
        }
    }
}

/// A unit together with its latest state record, as observed at one point
/// in time.
///
/// The snapshot's sequence number is what a caller hands back to the store
/// when appending; a stale snapshot makes the append fail with a conflict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// The message unit.
    pub unit: MessageUnit,
    /// The latest state record at observation time.
    pub current: StateRecord,
}

impl UnitSnapshot {
    /// Returns the unit's message id.
    pub fn id(&self) -> &MessageId {
        self.unit.message_id()
    }

    /// Returns the observed current state.
    pub fn state(&self) -> ProcessingState {
        self.current.state
    }

    /// Returns the observed sequence number.
    pub fn seq(&self) -> u32 {
        self.current.seq
    }
}
