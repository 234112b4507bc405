//! # Inbound Port - PullResolutionApi
//!
//! Primary driving port of the Pull Request Resolver, consumed by the
//! inbound pull-handling stage after the authentication stage produced the
//! set of policies the requester is authorized against.

use shared_types::{PolicyId, PullRequest, UserMessage};

use crate::domain::ResolutionError;

/// Primary API for pull resolution.
pub trait PullResolutionApi: Send + Sync {
    /// Claims the oldest waiting UserMessage on the Pull Request's channel
    /// whose policy is in `authorized`.
    ///
    /// Returns `Ok(None)` when nothing matches; the caller reports an
    /// empty pull result, not an error.
    fn resolve(
        &self,
        pull_request: &PullRequest,
        authorized: &[PolicyId],
    ) -> Result<Option<UserMessage>, ResolutionError>;
}
