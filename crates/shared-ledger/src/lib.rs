//! # Processing State Ledger
//!
//! Per-unit append-only log of state transitions. This is the foundation
//! every other subsystem builds on, and the only shared mutable resource in
//! the core.
//!
//! ## Concurrency Model
//!
//! The ledger never locks across calls. Writers read a snapshot, decide,
//! and perform a *conditional* append carrying the sequence number they
//! observed; the storage adapter rejects the append when another writer got
//! there first. Callers re-read and recompute on conflict, they never
//! overwrite.
//!
//! ```text
//! snapshot(seq=n) ──decide──→ append(expected=n) ──ok──→ seq=n+1
//!                                   │
//!                                   └── Conflict ──→ re-read, recompute
//! ```
//!
//! No transition is validated against a state-machine table here: validity
//! is enforced by the calling subsystems. The ledger is a dumb, race-safe
//! log.
//!
//! ## Module Structure
//!
//! ```text
//! domain/ledger.rs     - ProcessingLedger (append, transition retry loop)
//! domain/errors.rs     - LedgerError
//! ports/store.rs       - MessageStore trait (compare-and-append contract)
//! adapters/in_memory.rs - InMemoryMessageStore
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryMessageStore;
pub use domain::{LedgerError, ProcessingLedger, DEFAULT_MAX_APPEND_ATTEMPTS};
pub use ports::{MessageStore, StoreError};
