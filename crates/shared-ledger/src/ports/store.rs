//! Outbound (driven) port: the message-unit store.
//!
//! The persistence engine behind this trait is external; its storage format
//! is out of scope. The contract that matters here is the conditional
//! append: the store enforces the sequence check atomically.

use shared_types::{
    Direction, MessageId, MessageUnit, ProcessingState, StateRecord, Timestamp, UnitKind,
    UnitSnapshot,
};
use thiserror::Error;

/// Errors surfaced by a message store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Another writer appended a state since the caller's read.
    #[error("Concurrent append on {id}: expected seq {expected}, found {actual}")]
    Conflict {
        id: MessageId,
        expected: u32,
        actual: u32,
    },

    /// The unit id is not registered.
    #[error("Unknown message unit: {0}")]
    UnknownUnit(MessageId),

    /// A unit with this id is already registered.
    #[error("Duplicate message unit: {0}")]
    DuplicateUnit(MessageId),

    /// Storage backend failure.
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Storage contract for message units and their state sequences.
///
/// All mutating operations are atomic with respect to each other for the
/// same unit; `append` performs the compare-and-append that the whole
/// concurrency model of the core rests on.
pub trait MessageStore: Send + Sync {
    /// Registers a new unit with its initial state (sequence number 0).
    ///
    /// # Errors
    /// - `DuplicateUnit` if the id is already registered.
    fn register(
        &self,
        unit: MessageUnit,
        initial: ProcessingState,
        at: Timestamp,
    ) -> Result<UnitSnapshot, StoreError>;

    /// Returns the unit together with its latest state record.
    fn snapshot(&self, id: &MessageId) -> Option<UnitSnapshot>;

    /// Conditionally appends a state record.
    ///
    /// The append succeeds only when `expected_seq` equals the unit's
    /// latest sequence number at execution time; the check and the append
    /// are one atomic step.
    ///
    /// # Errors
    /// - `Conflict` when `expected_seq` is stale.
    /// - `UnknownUnit` when the id is not registered.
    fn append(
        &self,
        id: &MessageId,
        expected_seq: u32,
        state: ProcessingState,
        at: Timestamp,
        description: Option<String>,
    ) -> Result<StateRecord, StoreError>;

    /// Returns the full state sequence of a unit, oldest first.
    fn records(&self, id: &MessageId) -> Option<Vec<StateRecord>>;

    /// Returns every unit of the given kind and direction whose current
    /// state is one of `states`.
    fn find_in_state(
        &self,
        kind: UnitKind,
        direction: Direction,
        states: &[ProcessingState],
    ) -> Vec<UnitSnapshot>;
}
