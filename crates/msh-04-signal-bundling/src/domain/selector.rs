//! Pure selection rules for both bundling modes.

use shared_types::{ErrorMessage, ExchangeContext, UnitKind, UnitSnapshot};

/// Picks, per signal kind, the numerically oldest candidate by creation
/// timestamp. Ties break on message id for determinism.
///
/// Everything not picked is left exactly as it was: unchosen candidates
/// stay pending and compete again next round.
pub fn pick_oldest_per_kind(candidates: Vec<UnitSnapshot>) -> Vec<UnitSnapshot> {
    let mut oldest_receipt: Option<UnitSnapshot> = None;
    let mut oldest_error: Option<UnitSnapshot> = None;

    for candidate in candidates {
        let slot = match candidate.unit.kind() {
            UnitKind::Receipt => &mut oldest_receipt,
            UnitKind::ErrorMessage => &mut oldest_error,
            UnitKind::UserMessage | UnitKind::PullRequest => continue,
        };
        let replace = match slot {
            None => true,
            Some(current) => {
                let newer = (candidate.unit.created_at(), candidate.id());
                let held = (current.unit.created_at(), current.id());
                newer < held
            }
        };
        if replace {
            *slot = Some(candidate);
        }
    }

    oldest_receipt.into_iter().chain(oldest_error).collect()
}

/// Response-construction priority of an error; lower is more important.
fn response_priority(error: &ErrorMessage, context: &ExchangeContext) -> u8 {
    let Some(referenced_id) = error.header.refers_to.as_ref() else {
        // Describes the whole exchange
        return 0;
    };
    match context.find_unit(referenced_id).map(|s| s.unit.kind()) {
        Some(UnitKind::UserMessage) => 1,
        Some(UnitKind::PullRequest) => 2,
        Some(UnitKind::Receipt) | Some(UnitKind::ErrorMessage) => 3,
        // Reference outside this exchange: least specific to the response
        None => 4,
    }
}

/// Splits one batch of generated errors into the response's error and the
/// discarded rest.
///
/// Ties on priority break on creation timestamp then message id.
pub fn prioritize_response_errors(
    errors: Vec<ErrorMessage>,
    context: &ExchangeContext,
) -> (Option<ErrorMessage>, Vec<ErrorMessage>) {
    let winner = errors
        .iter()
        .min_by_key(|e| {
            (
                response_priority(e, context),
                e.header.created_at,
                e.header.message_id.clone(),
            )
        })
        .map(|e| e.header.message_id.clone());

    let Some(winner_id) = winner else {
        return (None, Vec::new());
    };

    let mut chosen = None;
    let mut discarded = Vec::new();
    for error in errors {
        if error.header.message_id == winner_id {
            chosen = Some(error);
        } else {
            discarded.push(error);
        }
    }
    (chosen, discarded)
}
