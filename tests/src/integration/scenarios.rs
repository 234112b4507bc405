//! # Reporting and Bundling Scenarios
//!
//! Decision-table scenarios for the Error Reporting Policy Engine and the
//! Signal Bundling Selector, driven through the container.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_ledger::InMemoryMessageStore;
    use shared_types::{
        Direction, ErrorMessage, ErrorReporting, ExchangeContext, ExchangePolicy,
        InMemoryPolicyStore, Leg, LegPolicy, ManualTimeSource, MepBinding, MessageUnit, Mpc,
        PolicyId, ProcessingState, PullRequest, Severity, StateRecord, Timestamp, UnitHeader,
        UnitSnapshot, UserMessage,
    };

    use msh_03_error_reporting::Disposition;
    use msh_core::{Msh, MshConfig};

    fn policy(id: &str, reporting: Option<ErrorReporting>) -> ExchangePolicy {
        ExchangePolicy::symmetric(
            PolicyId::new(id),
            LegPolicy {
                binding: MepBinding::Push,
                destination: Some("https://partner.example.com/msh".to_string()),
                receipt_expected: false,
                error_reporting: reporting,
                bundling_allowed: true,
            },
        )
    }

    fn msh(policies: &[ExchangePolicy]) -> Msh {
        let store = Arc::new(InMemoryPolicyStore::new());
        for p in policies {
            store.insert(p.clone());
        }
        Msh::new(
            MshConfig::default(),
            Arc::new(InMemoryMessageStore::new()),
            store,
            Arc::new(ManualTimeSource::new(1_000)),
        )
    }

    fn received_unit(unit: MessageUnit, state: ProcessingState) -> UnitSnapshot {
        UnitSnapshot {
            unit,
            current: StateRecord::initial(state, 1_000),
        }
    }

    fn received_user_message(policy: Option<&str>) -> MessageUnit {
        let mut header = UnitHeader::new(Direction::Received, Leg::Responder, 1_000);
        if let Some(p) = policy {
            header = header.with_policy(PolicyId::new(p));
        }
        MessageUnit::UserMessage(UserMessage::new(header, Mpc::default()))
    }

    fn generated_error(refers_to: Option<&MessageUnit>, created_at: Timestamp) -> ErrorMessage {
        let mut header = UnitHeader::new(Direction::Outgoing, Leg::Responder, created_at);
        if let Some(unit) = refers_to {
            header = header.with_refers_to(unit.message_id().clone());
        }
        ErrorMessage::new(header, Severity::Failure, "processing failed")
    }

    // =============================================================================
    // ERROR REPORTING SCENARIOS
    // =============================================================================

    /// Unreferenced error; one sibling failed, one completed: suppressed,
    /// with the audit trail Warning then Done.
    #[tokio::test]
    async fn test_mixed_outcomes_suppress_general_error() {
        let msh = msh(&[]);
        let mut context = ExchangeContext::new();
        context.add_received(received_unit(
            received_user_message(Some("ex-1")),
            ProcessingState::Failure,
        ));
        context.add_received(received_unit(
            received_user_message(Some("ex-1")),
            ProcessingState::Done,
        ));
        let error = generated_error(None, 2_000);
        context.add_generated_error(error.clone());

        let dispositions = msh.classify_errors(&mut context).await.expect("classify");

        assert_eq!(dispositions, vec![Disposition::Suppressed]);
        assert!(!context.response_needed);
        assert!(context.generated_errors.is_empty());
        let states: Vec<_> = msh
            .ledger()
            .states_of(&error.header.message_id)
            .expect("records")
            .iter()
            .map(|r| r.state)
            .collect();
        assert_eq!(
            states,
            vec![
                ProcessingState::Processing,
                ProcessingState::Warning,
                ProcessingState::Done,
            ]
        );
    }

    /// Unreferenced error; every sibling failed: reported in the response.
    #[tokio::test]
    async fn test_fully_failed_exchange_reports_general_error() {
        let msh = msh(&[]);
        let mut context = ExchangeContext::new();
        context.add_received(received_unit(
            received_user_message(Some("ex-1")),
            ProcessingState::Failure,
        ));
        context.add_received(received_unit(
            received_user_message(Some("ex-1")),
            ProcessingState::Failure,
        ));
        let error = generated_error(None, 2_000);
        context.add_generated_error(error.clone());

        let dispositions = msh.classify_errors(&mut context).await.expect("classify");

        assert_eq!(dispositions, vec![Disposition::Synchronous]);
        assert!(context.response_needed);
        assert_eq!(context.generated_errors.len(), 1);
    }

    /// An error on a PullRequest is synchronous even under an asynchronous
    /// reporting pattern.
    #[tokio::test]
    async fn test_pull_request_error_ignores_async_pattern() {
        let msh = msh(&[policy("ex-async", Some(ErrorReporting::AsyncPush))]);
        let mut context = ExchangeContext::with_response_channel();
        let pr = MessageUnit::PullRequest(PullRequest::new(
            UnitHeader::new(Direction::Received, Leg::Responder, 1_000)
                .with_policy(PolicyId::new("ex-async")),
            Mpc::default(),
        ));
        let error = generated_error(Some(&pr), 2_000);
        context.add_received(received_unit(pr, ProcessingState::Processing));
        context.add_generated_error(error);

        let dispositions = msh.classify_errors(&mut context).await.expect("classify");
        assert_eq!(dispositions, vec![Disposition::Synchronous]);
        assert!(context.response_needed);
    }

    /// An error on a UserMessage under an asynchronous pattern, with no
    /// response channel: queued for push.
    #[tokio::test]
    async fn test_async_pattern_queues_error_for_push() {
        let msh = msh(&[policy("ex-async", Some(ErrorReporting::AsyncPush))]);
        let mut context = ExchangeContext::new();
        let um = received_user_message(Some("ex-async"));
        let error = generated_error(Some(&um), 2_000);
        context.add_received(received_unit(um, ProcessingState::Failure));
        context.add_generated_error(error.clone());

        let dispositions = msh.classify_errors(&mut context).await.expect("classify");

        assert_eq!(dispositions, vec![Disposition::Asynchronous]);
        assert!(!context.response_needed);
        assert!(context.generated_errors.is_empty());
        assert_eq!(
            msh.ledger()
                .current_state(&error.header.message_id)
                .expect("state"),
            ProcessingState::ReadyToPush
        );
    }

    /// Classification of a whole batch is one pass, and the order of the
    /// batch does not change individual dispositions.
    #[tokio::test]
    async fn test_batch_classification_is_per_error() {
        let msh = msh(&[policy("ex-async", Some(ErrorReporting::AsyncPush))]);
        let mut context = ExchangeContext::with_response_channel();
        let um = received_user_message(Some("ex-async"));
        let on_message = generated_error(Some(&um), 2_000);
        let unreferenced = generated_error(None, 3_000);
        context.add_received(received_unit(um, ProcessingState::Failure));
        context.add_generated_error(on_message.clone());
        context.add_generated_error(unreferenced.clone());

        let dispositions = msh.classify_errors(&mut context).await.expect("classify");

        assert_eq!(
            dispositions,
            vec![Disposition::Asynchronous, Disposition::Synchronous]
        );
        // Only the synchronous one is still pending
        assert_eq!(context.generated_errors.len(), 1);
        assert_eq!(
            context.generated_errors[0].header.message_id,
            unreferenced.header.message_id
        );
    }

    // =============================================================================
    // BUNDLING SCENARIOS
    // =============================================================================

    /// Three pending errors to the same destination, T1 < T2 < T3: the T1
    /// error rides along, the others stay pending.
    #[tokio::test]
    async fn test_outbound_bundling_picks_oldest_pending_error() {
        let msh = msh(&[policy("ex-1", Some(ErrorReporting::AsyncPush))]);

        let mut ids = Vec::new();
        for t in [1_000u64, 2_000, 3_000] {
            let header = UnitHeader::new(Direction::Outgoing, Leg::Initiator, t)
                .with_policy(PolicyId::new("ex-1"));
            let snapshot = msh
                .ledger()
                .register(
                    MessageUnit::ErrorMessage(ErrorMessage::new(
                        header,
                        Severity::Failure,
                        "processing failed",
                    )),
                    ProcessingState::ReadyToPush,
                )
                .expect("register");
            ids.push(snapshot.id().clone());
        }

        let primary = MessageUnit::UserMessage(UserMessage::new(
            UnitHeader::new(Direction::Outgoing, Leg::Initiator, 5_000)
                .with_policy(PolicyId::new("ex-1")),
            Mpc::default(),
        ));
        let selected = msh.bundle_for(&primary).expect("bundle");

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id(), &ids[0]);
        for id in &ids[1..] {
            assert_eq!(
                msh.ledger().current_state(id).expect("state"),
                ProcessingState::ReadyToPush
            );
        }
    }

    /// Response construction with one unreferenced and one
    /// UserMessage-referencing error: the unreferenced error wins, the
    /// other fails immediately.
    #[tokio::test]
    async fn test_response_construction_discards_displaced_error() {
        let msh = msh(&[]);
        let mut context = ExchangeContext::with_response_channel();

        let um = received_user_message(None);
        let on_message = generated_error(Some(&um), 1_000);
        let unreferenced = generated_error(None, 2_000);
        context.add_received(received_unit(um, ProcessingState::Failure));
        for error in [&on_message, &unreferenced] {
            msh.ledger()
                .register(
                    MessageUnit::ErrorMessage((*error).clone()),
                    ProcessingState::Processing,
                )
                .expect("register");
            context.add_generated_error((*error).clone());
        }

        let chosen = msh
            .build_response(&mut context)
            .await
            .expect("build response")
            .expect("one error chosen");

        assert_eq!(chosen.header.message_id, unreferenced.header.message_id);
        assert_eq!(
            msh.ledger()
                .current_state(&on_message.header.message_id)
                .expect("state"),
            ProcessingState::Failure
        );
        assert_eq!(context.generated_errors.len(), 1);
        assert_eq!(
            context.sending.iter().map(|u| u.message_id()).collect::<Vec<_>>(),
            vec![&unreferenced.header.message_id]
        );
    }
}
