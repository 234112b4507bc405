//! Pull resolution error types.

use shared_ledger::LedgerError;
use shared_types::Mpc;
use thiserror::Error;

/// Errors surfaced by the Pull Request Resolver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// A ledger operation failed for a reason other than a lost claim.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Every selection round lost its claim; the channel is pathologically
    /// contended.
    #[error("Pull contention on channel {mpc}: lost {rounds} claim rounds")]
    Contention {
        /// The contended channel.
        mpc: Mpc,
        /// Number of selection rounds attempted.
        rounds: u32,
    },
}
