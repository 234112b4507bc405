//! # Integration Test Flows
//!
//! Tests that the subsystem crates work together correctly through the
//! `msh-core` container and the shared bus: submission, transmission,
//! acknowledgement, pull retrieval, and business-application hand-off.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    // Shared infrastructure
    use shared_bus::{EventFilter, EventTopic, ProcessingEvent};
    use shared_ledger::InMemoryMessageStore;
    use shared_types::{
        Direction, ErrorMessage, ErrorReporting, ExchangePolicy, InMemoryPolicyStore, Leg,
        LegPolicy, ManualTimeSource, MepBinding, MessageUnit, Mpc, PolicyId, ProcessingState,
        PullRequest, Receipt, Severity, UnitHeader, UserMessage,
    };

    use msh_01_delivery_correlation::{SignalOutcome, TransportResult};
    use msh_core::{Msh, MshConfig, ReceivedOutcome};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn policy(id: &str, binding: MepBinding, receipt_expected: bool) -> ExchangePolicy {
        ExchangePolicy::symmetric(
            PolicyId::new(id),
            LegPolicy {
                binding,
                destination: Some("https://partner.example.com/msh".to_string()),
                receipt_expected,
                error_reporting: Some(ErrorReporting::SyncResponse),
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

    fn user_message(policy_id: &str, mpc: &str) -> UserMessage {
        user_message_at(policy_id, mpc, 1_000)
    }

    fn user_message_at(policy_id: &str, mpc: &str, created_at: u64) -> UserMessage {
        let header = UnitHeader::new(Direction::Outgoing, Leg::Initiator, created_at)
            .with_policy(PolicyId::new(policy_id));
        UserMessage::new(header, Mpc::new(mpc))
    }

    // =============================================================================
    // PUSH FLOW: SUBMIT → SEND → RECEIPT
    // =============================================================================

    /// A UserMessage sent with receipt expected, followed by a matching
    /// Receipt, ends Delivered with the Receipt queued for hand-off.
    #[tokio::test]
    async fn test_push_round_trip_with_receipt() {
        let msh = msh(&[policy("ex-push", MepBinding::Push, true)]);

        let submitted = msh
            .submit(user_message("ex-push", shared_types::DEFAULT_MPC))
            .await
            .expect("submit");
        assert_eq!(submitted.state(), ProcessingState::ReadyToPush);

        // Outbound pipeline transmits
        let ids = [submitted.id().clone()];
        msh.sending(&ids).await.expect("sending");
        msh.transport_result(&ids, TransportResult::Success)
            .await
            .expect("transport");
        assert_eq!(
            msh.ledger().current_state(submitted.id()).expect("state"),
            ProcessingState::AwaitingReceipt
        );

        // Partner acknowledges
        let receipt = MessageUnit::Receipt(Receipt::new(
            UnitHeader::new(Direction::Received, Leg::Initiator, 2_000)
                .with_refers_to(submitted.id().clone()),
        ));
        let receipt_id = receipt.message_id().clone();
        let outcome = msh.received(receipt).await.expect("received");

        assert_eq!(
            outcome,
            ReceivedOutcome::Signal(SignalOutcome::Correlated {
                referenced: submitted.id().clone()
            })
        );
        assert_eq!(
            msh.ledger().current_state(submitted.id()).expect("state"),
            ProcessingState::Delivered
        );
        assert_eq!(
            msh.ledger().current_state(&receipt_id).expect("state"),
            ProcessingState::ReadyForDelivery
        );

        // Full audit trail, monotonically sequenced
        let records = msh.ledger().states_of(submitted.id()).expect("records");
        let states: Vec<_> = records.iter().map(|r| r.state).collect();
        assert_eq!(
            states,
            vec![
                ProcessingState::Created,
                ProcessingState::Submitted,
                ProcessingState::ReadyToPush,
                ProcessingState::Sending,
                ProcessingState::AwaitingReceipt,
                ProcessingState::Delivered,
            ]
        );
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.seq, i as u32);
        }
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_unit_retryable() {
        let msh = msh(&[policy("ex-push", MepBinding::Push, true)]);

        let submitted = msh
            .submit(user_message("ex-push", shared_types::DEFAULT_MPC))
            .await
            .expect("submit");
        let ids = [submitted.id().clone()];
        msh.sending(&ids).await.expect("sending");
        msh.transport_result(
            &ids,
            TransportResult::Failure {
                reason: "connection reset".to_string(),
            },
        )
        .await
        .expect("transport");

        let state = msh.ledger().current_state(submitted.id()).expect("state");
        assert_eq!(state, ProcessingState::TransportFailure);
        assert!(!state.is_terminal());

        // Retry: the outbound pipeline picks the unit up again
        msh.sending(&ids).await.expect("re-sending");
        msh.transport_result(&ids, TransportResult::Success)
            .await
            .expect("transport");
        assert_eq!(
            msh.ledger().current_state(submitted.id()).expect("state"),
            ProcessingState::AwaitingReceipt
        );
    }

    // =============================================================================
    // PULL FLOW
    // =============================================================================

    #[tokio::test]
    async fn test_pull_flow_delivers_oldest_waiting_message() {
        let msh = msh(&[policy("ex-pull", MepBinding::Pull, false)]);

        let first = msh
            .submit(user_message_at("ex-pull", "urn:mpc:orders", 1_000))
            .await
            .expect("submit");
        let _second = msh
            .submit(user_message_at("ex-pull", "urn:mpc:orders", 2_000))
            .await
            .expect("submit");

        let pr = PullRequest::new(
            UnitHeader::new(Direction::Received, Leg::Responder, 5_000),
            Mpc::new("urn:mpc:orders"),
        );
        msh.received(MessageUnit::PullRequest(pr.clone()))
            .await
            .expect("received");

        let claimed = msh
            .pulled(&pr, &[PolicyId::new("ex-pull")])
            .await
            .expect("pulled")
            .expect("claimed");
        assert_eq!(&claimed.header.message_id, first.id());
    }

    #[tokio::test]
    async fn test_empty_pull_is_not_an_error() {
        let msh = msh(&[policy("ex-pull", MepBinding::Pull, false)]);
        let pr = PullRequest::new(
            UnitHeader::new(Direction::Received, Leg::Responder, 5_000),
            Mpc::new("urn:mpc:empty"),
        );

        let claimed = msh
            .pulled(&pr, &[PolicyId::new("ex-pull")])
            .await
            .expect("pulled");
        assert!(claimed.is_none());
    }

    // =============================================================================
    // EVENT BUS: BUSINESS-APPLICATION OBSERVATION
    // =============================================================================

    #[tokio::test]
    async fn test_delivery_layer_observes_hand_off_events() {
        let msh = msh(&[policy("ex-push", MepBinding::Push, true)]);
        let mut delivery_events = msh.subscribe(EventFilter::topics(vec![EventTopic::Delivery]));

        let submitted = msh
            .submit(user_message("ex-push", shared_types::DEFAULT_MPC))
            .await
            .expect("submit");
        let ids = [submitted.id().clone()];
        msh.sending(&ids).await.expect("sending");
        msh.transport_result(&ids, TransportResult::Success)
            .await
            .expect("transport");

        let receipt = MessageUnit::Receipt(Receipt::new(
            UnitHeader::new(Direction::Received, Leg::Initiator, 2_000)
                .with_refers_to(submitted.id().clone()),
        ));
        msh.received(receipt).await.expect("received");

        // MessageDelivered for the acknowledged unit...
        let event = timeout(Duration::from_millis(100), delivery_events.recv())
            .await
            .expect("timeout")
            .expect("event");
        match event {
            ProcessingEvent::MessageDelivered { id } => assert_eq!(&id, submitted.id()),
            other => panic!("Expected MessageDelivered, got {other:?}"),
        }

        // ...then the receipt's hand-off notification
        let event = timeout(Duration::from_millis(100), delivery_events.recv())
            .await
            .expect("timeout")
            .expect("event");
        assert!(matches!(event, ProcessingEvent::ReadyForDelivery { .. }));
    }

    #[tokio::test]
    async fn test_error_signal_fails_referenced_unit_end_to_end() {
        let msh = msh(&[policy("ex-push", MepBinding::Push, true)]);

        let submitted = msh
            .submit(user_message("ex-push", shared_types::DEFAULT_MPC))
            .await
            .expect("submit");
        let ids = [submitted.id().clone()];
        msh.sending(&ids).await.expect("sending");
        msh.transport_result(&ids, TransportResult::Success)
            .await
            .expect("transport");

        let error = MessageUnit::ErrorMessage(ErrorMessage::new(
            UnitHeader::new(Direction::Received, Leg::Initiator, 3_000)
                .with_refers_to(submitted.id().clone()),
            Severity::Failure,
            "schema validation failed at partner",
        ));
        let error_id = error.message_id().clone();
        msh.received(error).await.expect("received");

        assert_eq!(
            msh.ledger().current_state(submitted.id()).expect("state"),
            ProcessingState::Failure
        );
        assert_eq!(
            msh.ledger().current_state(&error_id).expect("state"),
            ProcessingState::ReadyForDelivery
        );
    }

    #[tokio::test]
    async fn test_unknown_receipt_reference_raises_classifiable_error() {
        let msh = msh(&[policy("ex-push", MepBinding::Push, true)]);

        let receipt = MessageUnit::Receipt(Receipt::new(
            UnitHeader::new(Direction::Received, Leg::Initiator, 2_000)
                .with_refers_to(shared_types::MessageId::new("never-sent@partner")),
        ));
        let receipt_id = receipt.message_id().clone();

        let outcome = msh.received(receipt).await.expect("received");
        let ReceivedOutcome::Signal(SignalOutcome::Unresolved {
            generated: Some(error),
        }) = outcome
        else {
            panic!("Expected a raised processing error");
        };

        assert_eq!(
            msh.ledger().current_state(&receipt_id).expect("state"),
            ProcessingState::Failure
        );
        assert_eq!(error.header.refers_to.as_ref(), Some(&receipt_id));
        assert_eq!(
            msh.ledger()
                .current_state(&error.header.message_id)
                .expect("state"),
            ProcessingState::Processing
        );
    }
}
