//! The pure classification function.
//!
//! `classify` depends only on its arguments and the policy snapshot the
//! provider represents: same inputs, same disposition. All ledger effects
//! live in the service layer.

use shared_types::{
    leg_policy_for, ErrorMessage, ErrorReporting, ExchangeContext, PolicyProvider, UnitKind,
    UnitSnapshot,
};

/// How a generated error is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Attach to the response of the exchange being processed.
    Synchronous,
    /// Transmit in a later, separately initiated push.
    Asynchronous,
    /// Log and close; never transmit.
    Suppressed,
}

/// Classifies a newly generated error.
pub fn classify(
    error: &ErrorMessage,
    context: &ExchangeContext,
    policies: &dyn PolicyProvider,
) -> Disposition {
    let referenced = error
        .header
        .refers_to
        .as_ref()
        .and_then(|id| context.find_unit(id));

    let Some(referenced) = referenced else {
        return classify_general(context);
    };

    // Pull exchanges have no independent asynchronous return address: an
    // error on a PullRequest can only travel in the pull response.
    if referenced.unit.kind() == UnitKind::PullRequest {
        return Disposition::Synchronous;
    }

    match leg_policy_for(policies, &referenced.unit) {
        Some(leg) => match leg.error_reporting {
            Some(ErrorReporting::AsyncPush) => Disposition::Asynchronous,
            Some(ErrorReporting::SyncResponse) | None => Disposition::Synchronous,
        },
        // Policy unresolvable: attaching to a response in progress costs
        // nothing; without one there is no destination to determine.
        None => {
            if context.response_channel_available {
                Disposition::Synchronous
            } else {
                Disposition::Suppressed
            }
        }
    }
}

/// Classification of an error that references no unit: it describes the
/// exchange as a whole, so the exchange's outcomes decide.
fn classify_general(context: &ExchangeContext) -> Disposition {
    let any_succeeded = context
        .received
        .iter()
        .any(|snapshot: &UnitSnapshot| !snapshot.state().is_failure_class());

    if any_succeeded {
        // Mixed outcomes: reporting would misattribute a partially
        // successful exchange.
        Disposition::Suppressed
    } else {
        Disposition::Synchronous
    }
}
