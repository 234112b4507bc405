//! Bundling error types.

use shared_ledger::LedgerError;
use thiserror::Error;

/// Errors surfaced by the Signal Bundling Selector.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BundlingError {
    /// A ledger operation failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
