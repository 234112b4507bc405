//! Exchange policies ("P-Modes") and their lookup port.
//!
//! Policies are configuration: the core consumes them read-only and treats
//! a failed lookup as data, never as a fault.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::entities::{Leg, MessageUnit};

/// Identifier of an exchange policy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyId(String);

impl PolicyId {
    /// Creates a policy id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PolicyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How errors detected for a unit of this leg are reported back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorReporting {
    /// Attach the error to the response of the current exchange.
    SyncResponse,
    /// Push the error in a later, separately initiated message.
    AsyncPush,
}

/// How messages of a leg are transferred to the partner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MepBinding {
    /// The sender initiates the transfer.
    Push,
    /// The receiver retrieves the message with a Pull Request.
    Pull,
}

/// Per-leg configuration of an exchange policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegPolicy {
    /// How messages of this leg reach the partner.
    pub binding: MepBinding,
    /// Destination address for messages of this leg.
    pub destination: Option<String>,
    /// Whether a Receipt is expected for a sent UserMessage.
    pub receipt_expected: bool,
    /// Error-reporting pattern; absent means no explicit configuration.
    pub error_reporting: Option<ErrorReporting>,
    /// Whether signals of this leg may ride along on other messages.
    pub bundling_allowed: bool,
}

impl Default for LegPolicy {
    fn default() -> Self {
        Self {
            binding: MepBinding::Push,
            destination: None,
            receipt_expected: false,
            error_reporting: None,
            bundling_allowed: true,
        }
    }
}

/// Read-only configuration governing one messaging exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePolicy {
    /// Policy identifier.
    pub id: PolicyId,
    /// Configuration for the initiating side.
    pub initiator: LegPolicy,
    /// Configuration for the responding side.
    pub responder: LegPolicy,
}

impl ExchangePolicy {
    /// Creates a policy with identical leg configuration on both sides.
    pub fn symmetric(id: PolicyId, leg: LegPolicy) -> Self {
        Self {
            id,
            initiator: leg.clone(),
            responder: leg,
        }
    }

    /// Returns the configuration of the given leg.
    pub fn leg(&self, leg: Leg) -> &LegPolicy {
        match leg {
            Leg::Initiator => &self.initiator,
            Leg::Responder => &self.responder,
        }
    }
}

/// Lookup port for exchange policies.
///
/// Implementations are provided by the policy configuration subsystem; a
/// `None` result means the policy cannot be resolved, which callers handle
/// by their own fail-safe rules.
pub trait PolicyProvider: Send + Sync {
    /// Resolves a policy by id.
    fn policy(&self, id: &PolicyId) -> Option<ExchangePolicy>;
}

/// Resolves the leg policy governing a unit, if the unit names a policy and
/// that policy is known to the provider.
pub fn leg_policy_for(provider: &dyn PolicyProvider, unit: &MessageUnit) -> Option<LegPolicy> {
    let policy = provider.policy(unit.policy()?)?;
    Some(policy.leg(unit.header().leg).clone())
}

/// In-memory policy store, used by the composition root default wiring and
/// the test suites.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    policies: RwLock<HashMap<PolicyId, ExchangePolicy>>,
}

impl InMemoryPolicyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a policy.
    pub fn insert(&self, policy: ExchangePolicy) {
        if let Ok(mut policies) = self.policies.write() {
            policies.insert(policy.id.clone(), policy);
        }
    }

    /// Returns the number of stored policies.
    pub fn len(&self) -> usize {
        self.policies.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Returns true if no policies are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PolicyProvider for InMemoryPolicyStore {
    fn policy(&self, id: &PolicyId) -> Option<ExchangePolicy> {
        self.policies.read().ok()?.get(id).cloned()
    }
}
