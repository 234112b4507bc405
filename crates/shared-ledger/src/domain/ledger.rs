//! The processing ledger: conditional appends and the retry loop.

use std::sync::Arc;

use tracing::debug;

use shared_types::{
    MessageId, MessageUnit, ProcessingState, StateRecord, TimeSource, Timestamp, UnitSnapshot,
};

use crate::domain::errors::LedgerError;
use crate::ports::store::{MessageStore, StoreError};

/// Attempts a `transition` makes before giving up on a contended unit.
///
/// Contention on one unit is two call sites racing, so a loser normally
/// wins its second attempt; the bound exists to turn a livelock bug into a
/// visible error instead of a spin.
pub const DEFAULT_MAX_APPEND_ATTEMPTS: u32 = 8;

/// Race-safe append-only view over the message store.
///
/// Cloneable handle; all clones share the same store and clock.
#[derive(Clone)]
pub struct ProcessingLedger {
    store: Arc<dyn MessageStore>,
    time: Arc<dyn TimeSource>,
    max_attempts: u32,
}

impl ProcessingLedger {
    /// Creates a ledger over the given store and clock.
    pub fn new(store: Arc<dyn MessageStore>, time: Arc<dyn TimeSource>) -> Self {
        Self {
            store,
            time,
            max_attempts: DEFAULT_MAX_APPEND_ATTEMPTS,
        }
    }

    /// Overrides the retry bound of `transition`.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Registers a unit with its initial processing state.
    pub fn register(
        &self,
        unit: MessageUnit,
        initial: ProcessingState,
    ) -> Result<UnitSnapshot, LedgerError> {
        let snapshot = self.store.register(unit, initial, self.time.now())?;
        debug!(id = %snapshot.id(), state = %initial, "Message unit registered");
        Ok(snapshot)
    }

    /// Performs one conditional append at the snapshot's sequence number.
    ///
    /// Fails with a conflict when another writer appended since the
    /// snapshot was taken; the caller re-reads and recomputes.
    pub fn append_state(
        &self,
        snapshot: &UnitSnapshot,
        state: ProcessingState,
        description: Option<&str>,
    ) -> Result<UnitSnapshot, LedgerError> {
        let record = self.store.append(
            snapshot.id(),
            snapshot.seq(),
            state,
            self.time.now(),
            description.map(str::to_string),
        )?;
        debug!(id = %snapshot.id(), state = %state, seq = record.seq, "State appended");
        Ok(UnitSnapshot {
            unit: snapshot.unit.clone(),
            current: record,
        })
    }

    /// Re-read-and-recompute transition loop.
    ///
    /// Calls `decide` with the freshest snapshot; `Some((state, desc))`
    /// requests a conditional append at that snapshot's sequence, `None`
    /// aborts (the unit is no longer in a state the caller cares about).
    /// Lost appends re-enter the loop up to the configured bound.
    pub fn transition<F>(
        &self,
        id: &MessageId,
        mut decide: F,
    ) -> Result<Option<UnitSnapshot>, LedgerError>
    where
        F: FnMut(&UnitSnapshot) -> Option<(ProcessingState, Option<String>)>,
    {
        for attempt in 1..=self.max_attempts {
            let snapshot = self
                .store
                .snapshot(id)
                .ok_or_else(|| StoreError::UnknownUnit(id.clone()))?;

            let Some((state, description)) = decide(&snapshot) else {
                return Ok(None);
            };

            match self.store.append(
                id,
                snapshot.seq(),
                state,
                self.time.now(),
                description,
            ) {
                Ok(record) => {
                    debug!(id = %id, state = %state, seq = record.seq, "State appended");
                    return Ok(Some(UnitSnapshot {
                        unit: snapshot.unit,
                        current: record,
                    }));
                }
                Err(StoreError::Conflict { expected, actual, .. }) => {
                    debug!(
                        id = %id,
                        attempt,
                        expected,
                        actual,
                        "Conditional append lost, re-reading"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(LedgerError::RetriesExhausted {
            id: id.clone(),
            attempts: self.max_attempts,
        })
    }

    /// Returns the unit's current processing state.
    pub fn current_state(&self, id: &MessageId) -> Result<ProcessingState, LedgerError> {
        self.store
            .snapshot(id)
            .map(|s| s.state())
            .ok_or_else(|| StoreError::UnknownUnit(id.clone()).into())
    }

    /// Returns the unit's full state sequence, oldest first.
    pub fn states_of(&self, id: &MessageId) -> Result<Vec<StateRecord>, LedgerError> {
        self.store
            .records(id)
            .ok_or_else(|| StoreError::UnknownUnit(id.clone()).into())
    }

    /// Returns the unit with its latest state record, if registered.
    pub fn snapshot(&self, id: &MessageId) -> Option<UnitSnapshot> {
        self.store.snapshot(id)
    }

    /// Access to the underlying store (queries for selection components).
    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    /// Current time per the ledger's clock.
    pub fn now(&self) -> Timestamp {
        self.time.now()
    }
}
