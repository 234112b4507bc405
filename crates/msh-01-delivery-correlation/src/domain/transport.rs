//! Value objects for delivery correlation.

use shared_types::{ErrorMessage, MessageId};

/// Result of one transmission attempt, reported by the transport
/// collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportResult {
    /// The message reached the partner's MSH.
    Success,
    /// The transmission attempt failed.
    Failure {
        /// Transport-level failure description.
        reason: String,
    },
}

/// What applying one inbound signal did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The signal was applied to the unit it references.
    Correlated {
        /// The referenced unit.
        referenced: MessageId,
    },
    /// A receipt for a unit that was not awaiting one; suppressed.
    Duplicate {
        /// The referenced unit.
        referenced: MessageId,
    },
    /// The reference did not resolve; the signal itself was failed. For a
    /// receipt this also raises a processing error for classification.
    Unresolved {
        /// Candidate error generated for the reporting policy engine.
        generated: Option<ErrorMessage>,
    },
}
