//! Error reporting error types.

use shared_ledger::LedgerError;
use thiserror::Error;

/// Errors surfaced while applying a reporting decision.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportingError {
    /// A ledger operation failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
