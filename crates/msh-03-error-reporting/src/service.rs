//! Error reporting service.
//!
//! Runs the pure classifier and applies the decided disposition: ledger
//! transitions, pending-set membership, and the response-needed flag.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use shared_bus::{EventPublisher, ProcessingEvent};
use shared_ledger::ProcessingLedger;
use shared_types::{
    ErrorMessage, ExchangeContext, MessageUnit, PolicyProvider, ProcessingState, UnitSnapshot,
};

use crate::domain::classifier::{classify, Disposition};
use crate::domain::errors::ReportingError;
use crate::ports::inbound::ErrorReportingApi;

/// Error Reporting Policy Engine.
pub struct ReportingService {
    ledger: ProcessingLedger,
    policies: Arc<dyn PolicyProvider>,
    bus: Arc<dyn EventPublisher>,
}

impl ReportingService {
    /// Creates the engine over its collaborators.
    pub fn new(
        ledger: ProcessingLedger,
        policies: Arc<dyn PolicyProvider>,
        bus: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            ledger,
            policies,
            bus,
        }
    }

    /// Errors are classified while in `Processing`; a generator that did
    /// not register its error gets it registered here.
    fn ensure_registered(&self, error: &ErrorMessage) -> Result<UnitSnapshot, ReportingError> {
        if let Some(snapshot) = self.ledger.snapshot(&error.header.message_id) {
            return Ok(snapshot);
        }
        Ok(self.ledger.register(
            MessageUnit::ErrorMessage(error.clone()),
            ProcessingState::Processing,
        )?)
    }
}

#[async_trait]
impl ErrorReportingApi for ReportingService {
    async fn report(
        &self,
        error: &ErrorMessage,
        context: &mut ExchangeContext,
    ) -> Result<Disposition, ReportingError> {
        self.ensure_registered(error)?;
        let disposition = classify(error, context, self.policies.as_ref());
        let id = &error.header.message_id;

        match disposition {
            Disposition::Synchronous => {
                // The error stays in the pending-to-send set; the exchange
                // must now produce a response carrying it.
                context.response_needed = true;
                debug!(id = %id, "Error will be reported in the response");
            }
            Disposition::Asynchronous => {
                self.ledger
                    .transition(id, |_| Some((ProcessingState::ReadyToPush, None)))?;
                context.remove_generated_error(id);
                debug!(id = %id, "Error queued for asynchronous push");
            }
            Disposition::Suppressed => {
                let warned = self.ledger.transition(id, |_| {
                    Some((
                        ProcessingState::Warning,
                        Some("suppressed: no reportable destination".to_string()),
                    ))
                })?;
                if let Some(snapshot) = warned {
                    self.ledger
                        .append_state(&snapshot, ProcessingState::Done, None)?;
                }
                context.remove_generated_error(id);
                warn!(id = %id, detail = %error.detail, "Error suppressed, logged for audit");
                self.bus
                    .publish(ProcessingEvent::ErrorSuppressed {
                        id: id.clone(),
                        reason: "no reportable destination".to_string(),
                    })
                    .await;
            }
        }

        Ok(disposition)
    }
}
