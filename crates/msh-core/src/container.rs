//! The MSH container: wiring and pipeline entry points.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus, ProcessingEvent, Subscription};
use shared_ledger::{
    InMemoryMessageStore, LedgerError, MessageStore, ProcessingLedger,
};
use shared_types::{
    leg_policy_for, ErrorMessage, ExchangeContext, MepBinding, MessageId, MessageUnit, Mpc,
    PolicyId, PolicyProvider, ProcessingState, PullRequest, SystemTimeSource, TimeSource,
    UnitKind, UnitSnapshot, UserMessage,
};

use msh_01_delivery_correlation::{
    CorrelationApi, CorrelationError, CorrelationService, SignalOutcome, TransportResult,
};
use msh_02_pull_resolution::{PullResolutionApi, PullResolver, ResolutionError};
use msh_03_error_reporting::{Disposition, ErrorReportingApi, ReportingError, ReportingService};
use msh_04_signal_bundling::{BundlingError, BundlingService, SignalBundlingApi};

use crate::config::MshConfig;

/// Errors surfaced by the pipeline entry points.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A ledger operation failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Delivery correlation failed.
    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    /// Pull resolution failed.
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Error-reporting classification failed.
    #[error("Reporting error: {0}")]
    Reporting(#[from] ReportingError),

    /// Signal bundling failed.
    #[error("Bundling error: {0}")]
    Bundling(#[from] BundlingError),
}

/// What receiving one unit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceivedOutcome {
    /// A UserMessage, queued for hand-off to the business application.
    UserMessage(UnitSnapshot),
    /// A PullRequest, awaiting resolution via [`Msh::pulled`] once the
    /// authorization stage produced its policy set.
    PullRequest(UnitSnapshot),
    /// A signal, applied to the unit it references.
    Signal(SignalOutcome),
}

/// The wired Message Service Handler core.
pub struct Msh {
    config: MshConfig,
    ledger: ProcessingLedger,
    policies: Arc<dyn PolicyProvider>,
    bus: Arc<InMemoryEventBus>,
    correlation: CorrelationService,
    resolver: PullResolver,
    reporting: ReportingService,
    bundling: BundlingService,
}

impl Msh {
    /// Wires the core over explicit collaborators.
    pub fn new(
        config: MshConfig,
        store: Arc<dyn MessageStore>,
        policies: Arc<dyn PolicyProvider>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));
        let ledger =
            ProcessingLedger::new(store, time).with_max_attempts(config.max_append_attempts);

        let correlation =
            CorrelationService::new(ledger.clone(), policies.clone(), bus.clone());
        let resolver =
            PullResolver::new(ledger.clone()).with_max_rounds(config.max_claim_rounds);
        let reporting = ReportingService::new(ledger.clone(), policies.clone(), bus.clone());
        let bundling = BundlingService::new(ledger.clone(), policies.clone(), bus.clone());

        info!(
            default_mpc = %config.default_mpc,
            max_append_attempts = config.max_append_attempts,
            "MSH core wired"
        );
        Self {
            config,
            ledger,
            policies,
            bus,
            correlation,
            resolver,
            reporting,
            bundling,
        }
    }

    /// Default wiring: in-memory store, system clock.
    pub fn in_memory(policies: Arc<dyn PolicyProvider>) -> Self {
        Self::new(
            MshConfig::default(),
            Arc::new(InMemoryMessageStore::new()),
            policies,
            Arc::new(SystemTimeSource),
        )
    }

    /// The processing ledger.
    pub fn ledger(&self) -> &ProcessingLedger {
        &self.ledger
    }

    /// The core's configuration.
    pub fn config(&self) -> &MshConfig {
        &self.config
    }

    /// Subscribes an observer to processing events.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    /// Business-application submission of an outgoing UserMessage.
    ///
    /// The message is staged by its leg policy's transfer binding: pulled
    /// legs wait on their channel, pushed legs queue for transmission.
    pub async fn submit(&self, mut message: UserMessage) -> Result<UnitSnapshot, CoreError> {
        if message.mpc == Mpc::default() && self.config.default_mpc != message.mpc.as_str() {
            message.mpc = Mpc::new(self.config.default_mpc.clone());
        }

        let unit = MessageUnit::UserMessage(message);
        let snapshot = self.ledger.register(unit, ProcessingState::Created)?;
        self.bus
            .publish(ProcessingEvent::UnitRegistered {
                id: snapshot.id().clone(),
                kind: UnitKind::UserMessage,
                state: ProcessingState::Created,
            })
            .await;
        let snapshot = self
            .ledger
            .append_state(&snapshot, ProcessingState::Submitted, None)?;

        let staged = match leg_policy_for(self.policies.as_ref(), &snapshot.unit)
            .map(|leg| leg.binding)
        {
            Some(MepBinding::Pull) => ProcessingState::AwaitingPull,
            Some(MepBinding::Push) => ProcessingState::ReadyToPush,
            None => {
                warn!(
                    id = %snapshot.id(),
                    "No resolvable policy on submission, staging for push"
                );
                ProcessingState::ReadyToPush
            }
        };
        let snapshot = self.ledger.append_state(&snapshot, staged, None)?;
        debug!(id = %snapshot.id(), state = %staged, "UserMessage submitted");
        Ok(snapshot)
    }

    /// Entry point for every unit received over the wire, after the
    /// security and wire-format stages produced a message unit.
    pub async fn received(&self, unit: MessageUnit) -> Result<ReceivedOutcome, CoreError> {
        let kind = unit.kind();
        let snapshot = self.ledger.register(unit, ProcessingState::Processing)?;
        self.bus
            .publish(ProcessingEvent::UnitRegistered {
                id: snapshot.id().clone(),
                kind,
                state: ProcessingState::Processing,
            })
            .await;

        match kind {
            UnitKind::UserMessage => {
                // Payload processing (decryption, decompression) happened
                // upstream; what is left is handing the message over.
                let ready = self.ledger.append_state(
                    &snapshot,
                    ProcessingState::ReadyForDelivery,
                    None,
                )?;
                self.bus
                    .publish(ProcessingEvent::ReadyForDelivery {
                        id: ready.id().clone(),
                        kind: UnitKind::UserMessage,
                        refers_to: None,
                    })
                    .await;
                Ok(ReceivedOutcome::UserMessage(ready))
            }
            UnitKind::PullRequest => Ok(ReceivedOutcome::PullRequest(snapshot)),
            UnitKind::Receipt => Ok(ReceivedOutcome::Signal(
                self.correlation.apply_receipt(snapshot.id()).await?,
            )),
            UnitKind::ErrorMessage => Ok(ReceivedOutcome::Signal(
                self.correlation.apply_error_signal(snapshot.id()).await?,
            )),
        }
    }

    /// Resolves a received Pull Request against the policies its sender
    /// was authenticated for.
    pub async fn pulled(
        &self,
        pull_request: &PullRequest,
        authorized: &[PolicyId],
    ) -> Result<Option<UserMessage>, CoreError> {
        let claimed = self.resolver.resolve(pull_request, authorized)?;
        if let Some(message) = &claimed {
            self.bus
                .publish(ProcessingEvent::PullClaimed {
                    id: message.header.message_id.clone(),
                    mpc: message.mpc.clone(),
                })
                .await;
        }
        Ok(claimed)
    }

    /// Marks every unit of an outgoing message as in transmission.
    pub async fn sending(&self, ids: &[MessageId]) -> Result<(), CoreError> {
        self.correlation.mark_sending(ids).await?;
        Ok(())
    }

    /// Applies the transport collaborator's result for an outgoing
    /// message.
    pub async fn transport_result(
        &self,
        ids: &[MessageId],
        result: TransportResult,
    ) -> Result<(), CoreError> {
        self.correlation.apply_send_result(ids, result).await?;
        Ok(())
    }

    /// Classifies every not-yet-classified error of the exchange.
    pub async fn classify_errors(
        &self,
        context: &mut ExchangeContext,
    ) -> Result<Vec<Disposition>, CoreError> {
        let batch = context.generated_errors.clone();
        let mut dispositions = Vec::with_capacity(batch.len());
        for error in &batch {
            dispositions.push(self.reporting.report(error, context).await?);
        }
        Ok(dispositions)
    }

    /// Selects the pending signals riding along on a message originated by
    /// `primary`.
    pub fn bundle_for(&self, primary: &MessageUnit) -> Result<Vec<UnitSnapshot>, CoreError> {
        Ok(self.bundling.select_for_outbound(primary)?)
    }

    /// Picks the one error carried by the response under construction,
    /// discarding the rest of the batch.
    pub async fn build_response(
        &self,
        context: &mut ExchangeContext,
    ) -> Result<Option<ErrorMessage>, CoreError> {
        Ok(self.bundling.select_for_response(context).await?)
    }
}
