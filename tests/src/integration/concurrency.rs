//! # Concurrency Tests
//!
//! The ledger's compare-and-append is the only guard against the core's
//! races. These tests drive the claimed guarantees on a multi-thread
//! runtime: no double-claim, no lost or reordered appends.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use rand::seq::SliceRandom;
    use shared_ledger::InMemoryMessageStore;
    use shared_types::{
        Direction, ExchangePolicy, InMemoryPolicyStore, Leg, LegPolicy, ManualTimeSource,
        MepBinding, MessageId, Mpc, PolicyId, ProcessingState, PullRequest, UnitHeader,
        UserMessage,
    };

    use msh_core::{Msh, MshConfig};

    fn pull_policy(id: &str) -> ExchangePolicy {
        ExchangePolicy::symmetric(
            PolicyId::new(id),
            LegPolicy {
                binding: MepBinding::Pull,
                destination: Some("https://partner.example.com/msh".to_string()),
                receipt_expected: false,
                error_reporting: None,
                bundling_allowed: true,
            },
        )
    }

    fn msh() -> Arc<Msh> {
        let policies = Arc::new(InMemoryPolicyStore::new());
        policies.insert(pull_policy("ex-pull"));
        Arc::new(Msh::new(
            MshConfig::default(),
            Arc::new(InMemoryMessageStore::new()),
            policies,
            Arc::new(ManualTimeSource::new(1_000)),
        ))
    }

    fn user_message(created_at: u64) -> UserMessage {
        let header = UnitHeader::new(Direction::Outgoing, Leg::Initiator, created_at)
            .with_policy(PolicyId::new("ex-pull"));
        UserMessage::new(header, Mpc::new("urn:mpc:contended"))
    }

    /// Two concurrent resolve calls against the same channel never both
    /// claim the same unit.
    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_pulls_never_double_claim() {
        let msh = msh();
        let waiting = 16usize;
        let pullers = 32usize;

        // Submission order independent of age order
        let mut ages: Vec<u64> = (0..waiting as u64).map(|i| 1_000 + i).collect();
        ages.shuffle(&mut rand::thread_rng());
        for age in ages {
            msh.submit(user_message(age)).await.expect("submit");
        }

        let mut handles = Vec::with_capacity(pullers);
        for _ in 0..pullers {
            let msh = msh.clone();
            handles.push(tokio::spawn(async move {
                let pr = PullRequest::new(
                    UnitHeader::new(Direction::Received, Leg::Responder, 5_000),
                    Mpc::new("urn:mpc:contended"),
                );
                msh.pulled(&pr, &[PolicyId::new("ex-pull")])
                    .await
                    .expect("pulled")
            }));
        }

        let mut claimed: Vec<MessageId> = Vec::new();
        for handle in handles {
            if let Some(message) = handle.await.expect("join") {
                claimed.push(message.header.message_id);
            }
        }

        // Every waiting message claimed exactly once, the excess pullers
        // got an empty result
        assert_eq!(claimed.len(), waiting);
        let unique: HashSet<_> = claimed.iter().collect();
        assert_eq!(unique.len(), waiting, "a unit was claimed twice");
    }

    /// Concurrent writers on one unit lose cleanly and retry; the final
    /// sequence has no gaps and no duplicates.
    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_contended_unit_sequence_stays_dense() {
        let msh = msh();
        let submitted = msh.submit(user_message(1_000)).await.expect("submit");
        let id = submitted.id().clone();
        let writers = 8usize;

        let mut handles = Vec::with_capacity(writers);
        for _ in 0..writers {
            let msh = msh.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                // Raise the retry bound: eight writers of the same unit is
                // far above normal two-caller contention
                let ledger = msh.ledger().clone().with_max_attempts(64);
                ledger
                    .transition(&id, |_| Some((ProcessingState::Processing, None)))
                    .expect("transition")
            }));
        }
        for handle in handles {
            handle.await.expect("join");
        }

        let records = msh.ledger().states_of(&id).expect("records");
        // Created + Submitted + AwaitingPull + one append per writer
        assert_eq!(records.len(), 3 + writers);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.seq, i as u32, "sequence gap or duplicate");
        }
    }

    /// The claim race loser observes the winner's transition rather than
    /// silently overwriting it.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_message_single_winner() {
        for _ in 0..16 {
            let msh = msh();
            msh.submit(user_message(1_000)).await.expect("submit");

            let mut handles = Vec::new();
            for _ in 0..4 {
                let msh = msh.clone();
                handles.push(tokio::spawn(async move {
                    let pr = PullRequest::new(
                        UnitHeader::new(Direction::Received, Leg::Responder, 5_000),
                        Mpc::new("urn:mpc:contended"),
                    );
                    msh.pulled(&pr, &[PolicyId::new("ex-pull")])
                        .await
                        .expect("pulled")
                        .is_some()
                }));
            }

            let mut winners = 0;
            for handle in handles {
                if handle.await.expect("join") {
                    winners += 1;
                }
            }
            assert_eq!(winners, 1, "exactly one puller may win the unit");
        }
    }
}
