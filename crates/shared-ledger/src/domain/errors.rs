//! Ledger error types.

use shared_types::MessageId;
use thiserror::Error;

use crate::ports::store::StoreError;

/// Errors surfaced by ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The underlying store rejected the operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The bounded retry loop kept losing the conditional append.
    #[error("Ledger contention on {id}: {attempts} conditional appends lost")]
    RetriesExhausted { id: MessageId, attempts: u32 },
}
