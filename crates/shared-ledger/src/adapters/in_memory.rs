//! In-memory message store.
//!
//! Backs the composition root's default wiring and the test suites. A
//! production deployment substitutes a database-backed implementation of
//! the same port; the conditional-append contract is identical.

use std::collections::HashMap;
use std::sync::RwLock;

use shared_types::{
    Direction, MessageId, MessageUnit, ProcessingState, StateRecord, Timestamp, UnitKind,
    UnitSnapshot,
};

use crate::ports::store::{MessageStore, StoreError};

#[derive(Debug, Clone)]
struct StoredUnit {
    unit: MessageUnit,
    records: Vec<StateRecord>,
}

impl StoredUnit {
    fn latest(&self) -> &StateRecord {
        // records is non-empty from registration on
        &self.records[self.records.len() - 1]
    }

    fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            unit: self.unit.clone(),
            current: self.latest().clone(),
        }
    }
}

/// Message store keeping all units and state sequences in process memory.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    units: RwLock<HashMap<MessageId, StoredUnit>>,
}

impl InMemoryMessageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered units.
    pub fn len(&self) -> usize {
        self.units.read().map(|u| u.len()).unwrap_or(0)
    }

    /// Returns true if no units are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("store lock poisoned".to_string())
}

impl MessageStore for InMemoryMessageStore {
    fn register(
        &self,
        unit: MessageUnit,
        initial: ProcessingState,
        at: Timestamp,
    ) -> Result<UnitSnapshot, StoreError> {
        let id = unit.message_id().clone();
        let mut units = self.units.write().map_err(|_| poisoned())?;
        if units.contains_key(&id) {
            return Err(StoreError::DuplicateUnit(id));
        }

        let stored = StoredUnit {
            unit,
            records: vec![StateRecord::initial(initial, at)],
        };
        let snapshot = stored.snapshot();
        units.insert(id, stored);
        Ok(snapshot)
    }

    fn snapshot(&self, id: &MessageId) -> Option<UnitSnapshot> {
        self.units.read().ok()?.get(id).map(StoredUnit::snapshot)
    }

    fn append(
        &self,
        id: &MessageId,
        expected_seq: u32,
        state: ProcessingState,
        at: Timestamp,
        description: Option<String>,
    ) -> Result<StateRecord, StoreError> {
        let mut units = self.units.write().map_err(|_| poisoned())?;
        let stored = units
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownUnit(id.clone()))?;

        let actual = stored.latest().seq;
        if actual != expected_seq {
            return Err(StoreError::Conflict {
                id: id.clone(),
                expected: expected_seq,
                actual,
            });
        }

        let record = StateRecord::following(expected_seq, state, at, description);
        stored.records.push(record.clone());
        Ok(record)
    }

    fn records(&self, id: &MessageId) -> Option<Vec<StateRecord>> {
        self.units.read().ok()?.get(id).map(|s| s.records.clone())
    }

    fn find_in_state(
        &self,
        kind: UnitKind,
        direction: Direction,
        states: &[ProcessingState],
    ) -> Vec<UnitSnapshot> {
        let Ok(units) = self.units.read() else {
            return Vec::new();
        };
        units
            .values()
            .filter(|s| s.unit.kind() == kind && s.unit.direction() == direction)
            .filter(|s| states.contains(&s.latest().state))
            .map(StoredUnit::snapshot)
            .collect()
    }
}
