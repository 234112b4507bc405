//! # Inbound Port - CorrelationApi
//!
//! Primary driving port of the Delivery Outcome Correlator, consumed by
//! the outbound pipeline (send outcomes) and the inbound pipeline
//! (received signals).

use async_trait::async_trait;
use shared_types::MessageId;

use crate::domain::{CorrelationError, SignalOutcome, TransportResult};

/// Primary API for delivery correlation.
///
/// Send-outcome application and inbound-signal correlation may run
/// concurrently for different message units; the ledger's per-unit
/// sequence check serializes writers of the same unit.
#[async_trait]
pub trait CorrelationApi: Send + Sync {
    /// Moves every unit included in the outgoing message to `Sending`,
    /// immediately before the transmission attempt.
    async fn mark_sending(&self, ids: &[MessageId]) -> Result<(), CorrelationError>;

    /// Applies the outcome of a completed transmission attempt to every
    /// included unit.
    async fn apply_send_result(
        &self,
        ids: &[MessageId],
        result: TransportResult,
    ) -> Result<(), CorrelationError>;

    /// Applies a received Receipt to the unit it references.
    ///
    /// # Errors
    /// - `UnknownUnit` if the receipt itself is not registered.
    /// - `UnexpectedKind` if the id does not name a Receipt.
    async fn apply_receipt(&self, receipt_id: &MessageId)
        -> Result<SignalOutcome, CorrelationError>;

    /// Applies a received Error signal to the unit it references.
    ///
    /// # Errors
    /// - `UnknownUnit` if the error signal is not registered.
    /// - `UnexpectedKind` if the id does not name an ErrorMessage.
    async fn apply_error_signal(
        &self,
        error_id: &MessageId,
    ) -> Result<SignalOutcome, CorrelationError>;
}
