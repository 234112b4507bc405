//! Select-and-claim resolution of Pull Requests.

use tracing::debug;

use shared_ledger::{LedgerError, ProcessingLedger, StoreError};
use shared_types::{
    Direction, MessageUnit, PolicyId, ProcessingState, PullRequest, UnitKind, UnitSnapshot,
    UserMessage,
};

use crate::domain::errors::ResolutionError;
use crate::ports::inbound::PullResolutionApi;

/// Selection rounds before a pathologically contended channel is reported.
///
/// A lost round means another puller claimed the selected unit between this
/// caller's read and its append; the next round selects the next-oldest
/// unit, so consecutive losses require a fresh competitor each time.
pub const DEFAULT_MAX_CLAIM_ROUNDS: u32 = 8;

/// Pull Request Resolver.
#[derive(Clone)]
pub struct PullResolver {
    ledger: ProcessingLedger,
    max_rounds: u32,
}

impl PullResolver {
    /// Creates a resolver over the ledger.
    pub fn new(ledger: ProcessingLedger) -> Self {
        Self {
            ledger,
            max_rounds: DEFAULT_MAX_CLAIM_ROUNDS,
        }
    }

    /// Overrides the selection-round bound.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// One selection pass: the oldest waiting UserMessage on the channel
    /// within the authorized policy set.
    fn select(&self, pull_request: &PullRequest, authorized: &[PolicyId]) -> Option<UnitSnapshot> {
        let mut candidates = self.ledger.store().find_in_state(
            UnitKind::UserMessage,
            Direction::Outgoing,
            &[ProcessingState::AwaitingPull],
        );
        candidates.retain(|snapshot| {
            snapshot.unit.mpc() == Some(&pull_request.mpc)
                && snapshot
                    .unit
                    .policy()
                    .is_some_and(|policy| authorized.contains(policy))
        });
        candidates.into_iter().min_by(|a, b| {
            a.unit
                .created_at()
                .cmp(&b.unit.created_at())
                // Deterministic tie-breaker using the message id
                .then_with(|| a.id().cmp(b.id()))
        })
    }
}

impl PullResolutionApi for PullResolver {
    fn resolve(
        &self,
        pull_request: &PullRequest,
        authorized: &[PolicyId],
    ) -> Result<Option<UserMessage>, ResolutionError> {
        let claim_note = format!(
            "claimed by pull request {}",
            pull_request.header.message_id
        );

        for round in 1..=self.max_rounds {
            let Some(selected) = self.select(pull_request, authorized) else {
                debug!(mpc = %pull_request.mpc, "Empty pull: no waiting message");
                return Ok(None);
            };

            // Selection and claim are one conditional append: Processing
            // is appended at the sequence number observed during
            // selection, so a concurrent claimer makes this append lose.
            match self
                .ledger
                .append_state(&selected, ProcessingState::Processing, Some(claim_note.as_str()))
            {
                Ok(claimed) => {
                    debug!(
                        id = %claimed.id(),
                        mpc = %pull_request.mpc,
                        round,
                        "Waiting message claimed"
                    );
                    let MessageUnit::UserMessage(message) = claimed.unit else {
                        // find_in_state only returns UserMessages
                        continue;
                    };
                    return Ok(Some(message));
                }
                Err(LedgerError::Store(StoreError::Conflict { .. })) => {
                    debug!(
                        id = %selected.id(),
                        mpc = %pull_request.mpc,
                        round,
                        "Claim lost, re-selecting"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(ResolutionError::Contention {
            mpc: pull_request.mpc.clone(),
            rounds: self.max_rounds,
        })
    }
}
