//! Correlation error types.

use shared_ledger::LedgerError;
use shared_types::{MessageId, UnitKind};
use thiserror::Error;

/// Errors surfaced by the Delivery Outcome Correlator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CorrelationError {
    /// A ledger operation failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The given id is not registered.
    #[error("Unknown message unit: {0}")]
    UnknownUnit(MessageId),

    /// The operation was invoked on the wrong unit variant.
    #[error("Unit {id} is not a {expected:?}")]
    UnexpectedKind {
        /// The offending unit.
        id: MessageId,
        /// The variant the operation requires.
        expected: UnitKind,
    },
}
