//! Core domain entities for the Message Service Handler.
//!
//! Defines the four message-unit variants exchanged between trading
//! partners and the header attributes common to all of them.

use serde::{Deserialize, Serialize};

use crate::policy::PolicyId;

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// Globally unique identifier of a message unit, assigned at creation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Creates a message id from an externally supplied value (e.g. a
    /// received message header).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh, globally unique message id for a locally created
    /// unit.
    pub fn generate() -> Self {
        Self(format!("{}@msh", uuid::Uuid::new_v4()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default message partition channel, used when a unit does not name one.
pub const DEFAULT_MPC: &str =
    "http://docs.oasis-open.org/ebxml-msg/ebms/v3.0/ns/core/200704/defaultMPC";

/// A named queue that Pull Requests draw from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mpc(String);

impl Mpc {
    /// Creates a channel identifier.
    pub fn new(mpc: impl Into<String>) -> Self {
        Self(mpc.into())
    }

    /// Returns the channel as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Mpc {
    fn default() -> Self {
        Self(DEFAULT_MPC.to_string())
    }
}

impl std::fmt::Display for Mpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a unit was received over the wire or is to be sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Received from a trading partner.
    Received,
    /// Created locally, to be transmitted.
    Outgoing,
}

/// The side of the exchange this MSH plays for a given unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Leg {
    /// This MSH initiated the exchange.
    Initiator,
    /// This MSH responds to an exchange initiated by the partner.
    Responder,
}

/// Discriminant of the four message-unit variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Business payload carrier.
    UserMessage,
    /// Request to retrieve a waiting message from a partition channel.
    PullRequest,
    /// Acknowledgement signal.
    Receipt,
    /// Error report signal.
    ErrorMessage,
}

/// Severity of a reported error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Recoverable problem; processing of the exchange continued.
    Warning,
    /// The referenced unit could not be processed.
    Failure,
}

/// Attributes common to every message-unit variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitHeader {
    /// Globally unique message identifier.
    pub message_id: MessageId,
    /// Identifier of the unit this signal acknowledges or reports on.
    pub refers_to: Option<MessageId>,
    /// Exchange policy governing this unit; may be absent or unresolvable.
    pub policy: Option<PolicyId>,
    /// Which side of the exchange this MSH plays for the unit.
    pub leg: Leg,
    /// Received or to-be-sent.
    pub direction: Direction,
    /// Creation timestamp (ms).
    pub created_at: Timestamp,
}

impl UnitHeader {
    /// Creates a header with a freshly generated message id.
    pub fn new(direction: Direction, leg: Leg, created_at: Timestamp) -> Self {
        Self {
            message_id: MessageId::generate(),
            refers_to: None,
            policy: None,
            leg,
            direction,
            created_at,
        }
    }

    /// Sets the message id (received units carry the partner's id).
    pub fn with_id(mut self, id: MessageId) -> Self {
        self.message_id = id;
        self
    }

    /// Sets the referenced message id.
    pub fn with_refers_to(mut self, id: MessageId) -> Self {
        self.refers_to = Some(id);
        self
    }

    /// Sets the governing exchange policy.
    pub fn with_policy(mut self, id: PolicyId) -> Self {
        self.policy = Some(id);
        self
    }
}

/// A business message exchanged between trading partners.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    /// Common unit attributes.
    pub header: UnitHeader,
    /// Partition channel this message is assigned to (pull retrieval).
    pub mpc: Mpc,
    /// Opaque references to the business payloads; content is out of scope.
    pub payload_refs: Vec<String>,
}

impl UserMessage {
    /// Creates a user message on the given channel.
    pub fn new(header: UnitHeader, mpc: Mpc) -> Self {
        Self {
            header,
            mpc,
            payload_refs: Vec::new(),
        }
    }
}

/// A request to retrieve one waiting message from a partition channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Common unit attributes.
    pub header: UnitHeader,
    /// Channel the requester wants to draw from.
    pub mpc: Mpc,
}

impl PullRequest {
    /// Creates a pull request for the given channel.
    pub fn new(header: UnitHeader, mpc: Mpc) -> Self {
        Self { header, mpc }
    }
}

/// An acknowledgement signal for a previously sent user message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Common unit attributes; `refers_to` names the acknowledged unit.
    pub header: UnitHeader,
}

impl Receipt {
    /// Creates a receipt signal.
    pub fn new(header: UnitHeader) -> Self {
        Self { header }
    }
}

/// An error report signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Common unit attributes; `refers_to` names the unit reported on, if
    /// the error could be attributed to one.
    pub header: UnitHeader,
    /// Severity of the reported problem.
    pub severity: Severity,
    /// Free-text description, kept for audit logging.
    pub detail: String,
}

impl ErrorMessage {
    /// Creates an error signal.
    pub fn new(header: UnitHeader, severity: Severity, detail: impl Into<String>) -> Self {
        Self {
            header,
            severity,
            detail: detail.into(),
        }
    }
}

/// A message unit: the one entity every pipeline stage operates on.
///
/// Rule tables in the subsystem crates match on this enum exhaustively;
/// adding a variant is a compile-checked, deliberate act.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageUnit {
    /// Business payload carrier.
    UserMessage(UserMessage),
    /// Pull retrieval request.
    PullRequest(PullRequest),
    /// Acknowledgement signal.
    Receipt(Receipt),
    /// Error report signal.
    ErrorMessage(ErrorMessage),
}

impl MessageUnit {
    /// Returns the common header of any variant.
    pub fn header(&self) -> &UnitHeader {
        match self {
            Self::UserMessage(m) => &m.header,
            Self::PullRequest(p) => &p.header,
            Self::Receipt(r) => &r.header,
            Self::ErrorMessage(e) => &e.header,
        }
    }

    /// Returns the unit's message id.
    pub fn message_id(&self) -> &MessageId {
        &self.header().message_id
    }

    /// Returns the id of the unit this signal refers to, if any.
    pub fn refers_to(&self) -> Option<&MessageId> {
        self.header().refers_to.as_ref()
    }

    /// Returns the governing policy id, if one was resolved.
    pub fn policy(&self) -> Option<&PolicyId> {
        self.header().policy.as_ref()
    }

    /// Returns the variant discriminant.
    pub fn kind(&self) -> UnitKind {
        match self {
            Self::UserMessage(_) => UnitKind::UserMessage,
            Self::PullRequest(_) => UnitKind::PullRequest,
            Self::Receipt(_) => UnitKind::Receipt,
            Self::ErrorMessage(_) => UnitKind::ErrorMessage,
        }
    }

    /// Returns the partition channel for units that carry one.
    pub fn mpc(&self) -> Option<&Mpc> {
        match self {
            Self::UserMessage(m) => Some(&m.mpc),
            Self::PullRequest(p) => Some(&p.mpc),
            Self::Receipt(_) | Self::ErrorMessage(_) => None,
        }
    }

    /// True for Receipt and ErrorMessage units.
    pub fn is_signal(&self) -> bool {
        matches!(self, Self::Receipt(_) | Self::ErrorMessage(_))
    }

    /// Returns the unit's direction.
    pub fn direction(&self) -> Direction {
        self.header().direction
    }

    /// Returns the unit's creation timestamp.
    pub fn created_at(&self) -> Timestamp {
        self.header().created_at
    }
}
