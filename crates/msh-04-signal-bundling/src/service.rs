//! Signal bundling service.
//!
//! Wires the pure selection rules to the ledger queries and applies the
//! discard semantics of response construction.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use shared_bus::{EventPublisher, ProcessingEvent};
use shared_ledger::ProcessingLedger;
use shared_types::{
    leg_policy_for, Direction, ErrorMessage, ExchangeContext, MessageUnit, PolicyProvider,
    ProcessingState, UnitKind, UnitSnapshot,
};

use crate::domain::errors::BundlingError;
use crate::domain::selector::{pick_oldest_per_kind, prioritize_response_errors};
use crate::ports::inbound::SignalBundlingApi;

/// States making a signal a bundling candidate.
const PENDING_STATES: [ProcessingState; 2] = [
    ProcessingState::ReadyToPush,
    ProcessingState::TransportFailure,
];

/// Signal Bundling Selector.
pub struct BundlingService {
    ledger: ProcessingLedger,
    policies: Arc<dyn PolicyProvider>,
    bus: Arc<dyn EventPublisher>,
}

impl BundlingService {
    /// Creates the selector over its collaborators.
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

    /// Destination a unit's leg policy routes it to, if resolvable.
    fn destination_of(&self, unit: &MessageUnit) -> Option<String> {
        leg_policy_for(self.policies.as_ref(), unit)?.destination
    }

    /// Pending signals routed to `destination` whose policy permits
    /// bundling.
    fn pending_signals_to(&self, destination: &str) -> Vec<UnitSnapshot> {
        let mut candidates = Vec::new();
        for kind in [UnitKind::Receipt, UnitKind::ErrorMessage] {
            candidates.extend(self.ledger.store().find_in_state(
                kind,
                Direction::Outgoing,
                &PENDING_STATES,
            ));
        }
        candidates.retain(|snapshot| {
            leg_policy_for(self.policies.as_ref(), &snapshot.unit).is_some_and(|leg| {
                leg.bundling_allowed && leg.destination.as_deref() == Some(destination)
            })
        });
        candidates
    }
}

#[async_trait]
impl SignalBundlingApi for BundlingService {
    fn select_for_outbound(
        &self,
        primary: &MessageUnit,
    ) -> Result<Vec<UnitSnapshot>, BundlingError> {
        let Some(destination) = self.destination_of(primary) else {
            // Nowhere to route the message, nothing can ride along
            debug!(id = %primary.message_id(), "Primary unit has no resolvable destination");
            return Ok(Vec::new());
        };

        let selected = pick_oldest_per_kind(self.pending_signals_to(&destination));
        debug!(
            primary = %primary.message_id(),
            destination = %destination,
            selected = selected.len(),
            "Outbound bundling selection"
        );
        Ok(selected)
    }

    async fn select_for_response(
        &self,
        context: &mut ExchangeContext,
    ) -> Result<Option<ErrorMessage>, BundlingError> {
        let batch = std::mem::take(&mut context.generated_errors);
        let (chosen, discarded) = prioritize_response_errors(batch, context);

        // Once the response is sent there is no further opportunity to
        // deliver the rest of the batch.
        for error in discarded {
            let id = error.header.message_id.clone();
            if self.ledger.snapshot(&id).is_none() {
                self.ledger.register(
                    MessageUnit::ErrorMessage(error.clone()),
                    ProcessingState::Processing,
                )?;
            }
            self.ledger.transition(&id, |_| {
                Some((
                    ProcessingState::Failure,
                    Some("displaced by a higher-priority error in the response".to_string()),
                ))
            })?;
            warn!(id = %id, "Error displaced from response, failed");
            self.bus
                .publish(ProcessingEvent::MessageFailed {
                    id,
                    reason: "displaced by a higher-priority error in the response".to_string(),
                })
                .await;
        }

        if let Some(chosen) = &chosen {
            context.generated_errors.push(chosen.clone());
            context.add_sending(MessageUnit::ErrorMessage(chosen.clone()));
            debug!(id = %chosen.header.message_id, "Error selected for the response");
        }
        Ok(chosen)
    }
}
