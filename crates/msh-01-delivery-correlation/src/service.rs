//! Delivery correlation service.
//!
//! Implements `CorrelationApi` on top of the processing ledger, the policy
//! lookup, and the event bus.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use shared_bus::{EventPublisher, ProcessingEvent};
use shared_ledger::ProcessingLedger;
use shared_types::{
    leg_policy_for, Direction, ErrorMessage, MessageId, MessageUnit, PolicyProvider,
    ProcessingState, Severity, UnitHeader, UnitKind, UnitSnapshot,
};

use crate::domain::{CorrelationError, SignalOutcome, TransportResult};
use crate::ports::inbound::CorrelationApi;

/// Delivery Outcome Correlator.
pub struct CorrelationService {
    ledger: ProcessingLedger,
    policies: Arc<dyn PolicyProvider>,
    bus: Arc<dyn EventPublisher>,
}

impl CorrelationService {
    /// Creates the correlator over its collaborators.
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

    fn snapshot_of(&self, id: &MessageId) -> Result<UnitSnapshot, CorrelationError> {
        self.ledger
            .snapshot(id)
            .ok_or_else(|| CorrelationError::UnknownUnit(id.clone()))
    }

    /// Target state of a successfully transmitted unit.
    fn success_state(&self, unit: &MessageUnit) -> ProcessingState {
        match unit {
            MessageUnit::Receipt(_) | MessageUnit::ErrorMessage(_) => ProcessingState::Delivered,
            // A pull request carries no receipt expectation; transmitted
            // means complete.
            MessageUnit::PullRequest(_) => ProcessingState::Done,
            MessageUnit::UserMessage(_) => {
                let expects_receipt = leg_policy_for(self.policies.as_ref(), unit)
                    .map(|leg| leg.receipt_expected)
                    .unwrap_or(false);
                if expects_receipt {
                    ProcessingState::AwaitingReceipt
                } else {
                    ProcessingState::Delivered
                }
            }
        }
    }

    /// Fails an inbound signal whose reference does not resolve. For a
    /// receipt this also raises a processing error for classification.
    async fn fail_unresolved(
        &self,
        signal: &UnitSnapshot,
        raise_error: bool,
    ) -> Result<SignalOutcome, CorrelationError> {
        self.ledger.transition(signal.id(), |_| {
            Some((
                ProcessingState::Failure,
                Some("references an unknown unit".to_string()),
            ))
        })?;
        warn!(id = %signal.id(), kind = ?signal.unit.kind(), "Signal references an unknown unit");
        self.bus
            .publish(ProcessingEvent::MessageFailed {
                id: signal.id().clone(),
                reason: "references an unknown unit".to_string(),
            })
            .await;

        if !raise_error {
            return Ok(SignalOutcome::Unresolved { generated: None });
        }

        let mut header = UnitHeader::new(
            Direction::Outgoing,
            signal.unit.header().leg,
            self.ledger.now(),
        )
        .with_refers_to(signal.id().clone());
        if let Some(policy) = signal.unit.policy() {
            header = header.with_policy(policy.clone());
        }
        let error = ErrorMessage::new(
            header,
            Severity::Failure,
            format!("Receipt {} references an unknown unit", signal.id()),
        );
        self.ledger.register(
            MessageUnit::ErrorMessage(error.clone()),
            ProcessingState::Processing,
        )?;

        Ok(SignalOutcome::Unresolved {
            generated: Some(error),
        })
    }
}

#[async_trait]
impl CorrelationApi for CorrelationService {
    async fn mark_sending(&self, ids: &[MessageId]) -> Result<(), CorrelationError> {
        for id in ids {
            self.ledger
                .transition(id, |_| Some((ProcessingState::Sending, None)))?;
        }
        Ok(())
    }

    async fn apply_send_result(
        &self,
        ids: &[MessageId],
        result: TransportResult,
    ) -> Result<(), CorrelationError> {
        match result {
            TransportResult::Failure { reason } => {
                for id in ids {
                    self.ledger.transition(id, |_| {
                        Some((ProcessingState::TransportFailure, Some(reason.clone())))
                    })?;
                    warn!(id = %id, reason = %reason, "Transmission attempt failed");
                    self.bus
                        .publish(ProcessingEvent::TransportFailed { id: id.clone() })
                        .await;
                }
            }
            TransportResult::Success => {
                for id in ids {
                    let snapshot = self.snapshot_of(id)?;
                    let target = self.success_state(&snapshot.unit);
                    self.ledger.transition(id, |_| Some((target, None)))?;
                    debug!(id = %id, state = %target, "Send outcome applied");
                    if target == ProcessingState::Delivered {
                        self.bus
                            .publish(ProcessingEvent::MessageDelivered { id: id.clone() })
                            .await;
                    }
                }
            }
        }
        Ok(())
    }

    async fn apply_receipt(
        &self,
        receipt_id: &MessageId,
    ) -> Result<SignalOutcome, CorrelationError> {
        let receipt = self.snapshot_of(receipt_id)?;
        if receipt.unit.kind() != UnitKind::Receipt {
            return Err(CorrelationError::UnexpectedKind {
                id: receipt_id.clone(),
                expected: UnitKind::Receipt,
            });
        }

        let referenced_id = match receipt.unit.refers_to() {
            Some(id) => id.clone(),
            None => return self.fail_unresolved(&receipt, true).await,
        };
        if self.ledger.snapshot(&referenced_id).is_none() {
            return self.fail_unresolved(&receipt, true).await;
        }

        // The acknowledgement only applies while the unit still awaits its
        // receipt; a concurrent or earlier writer turns this receipt into a
        // duplicate.
        let applied = self.ledger.transition(&referenced_id, |current| {
            (current.state() == ProcessingState::AwaitingReceipt)
                .then(|| (ProcessingState::Delivered, None))
        })?;

        if applied.is_none() {
            let duplicate = self.ledger.transition(receipt_id, |_| {
                Some((
                    ProcessingState::Warning,
                    Some(format!("duplicate receipt for {referenced_id}")),
                ))
            })?;
            if let Some(snapshot) = duplicate {
                self.ledger
                    .append_state(&snapshot, ProcessingState::Done, None)?;
            }
            warn!(id = %receipt_id, referenced = %referenced_id, "Duplicate receipt suppressed");
            return Ok(SignalOutcome::Duplicate {
                referenced: referenced_id,
            });
        }

        self.ledger
            .transition(receipt_id, |_| Some((ProcessingState::ReadyForDelivery, None)))?;

        debug!(id = %receipt_id, referenced = %referenced_id, "Receipt correlated");
        self.bus
            .publish(ProcessingEvent::MessageDelivered {
                id: referenced_id.clone(),
            })
            .await;
        self.bus
            .publish(ProcessingEvent::ReadyForDelivery {
                id: receipt_id.clone(),
                kind: UnitKind::Receipt,
                refers_to: Some(referenced_id.clone()),
            })
            .await;

        Ok(SignalOutcome::Correlated {
            referenced: referenced_id,
        })
    }

    async fn apply_error_signal(
        &self,
        error_id: &MessageId,
    ) -> Result<SignalOutcome, CorrelationError> {
        let signal = self.snapshot_of(error_id)?;
        let detail = match &signal.unit {
            MessageUnit::ErrorMessage(e) => e.detail.clone(),
            _ => {
                return Err(CorrelationError::UnexpectedKind {
                    id: error_id.clone(),
                    expected: UnitKind::ErrorMessage,
                })
            }
        };

        let referenced_id = match signal.unit.refers_to() {
            Some(id) => id.clone(),
            None => return self.fail_unresolved(&signal, false).await,
        };
        if self.ledger.snapshot(&referenced_id).is_none() {
            return self.fail_unresolved(&signal, false).await;
        }

        self.ledger.transition(&referenced_id, |_| {
            Some((
                ProcessingState::Failure,
                Some(format!("error signal {error_id} received")),
            ))
        })?;
        self.ledger
            .transition(error_id, |_| Some((ProcessingState::ReadyForDelivery, None)))?;

        warn!(id = %error_id, referenced = %referenced_id, detail = %detail, "Error signal correlated");
        self.bus
            .publish(ProcessingEvent::MessageFailed {
                id: referenced_id.clone(),
                reason: detail,
            })
            .await;
        self.bus
            .publish(ProcessingEvent::ReadyForDelivery {
                id: error_id.clone(),
                kind: UnitKind::ErrorMessage,
                refers_to: Some(referenced_id.clone()),
            })
            .await;

        Ok(SignalOutcome::Correlated {
            referenced: referenced_id,
        })
    }
}
