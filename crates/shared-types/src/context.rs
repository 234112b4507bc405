//! The per-exchange processing context.
//!
//! One `ExchangeContext` exists per in-flight inbound-or-outbound message
//! being processed. It is owned exclusively by the processing run that
//! created it, passed explicitly into component calls, and never persisted.

use crate::entities::{ErrorMessage, MessageId, MessageUnit};
use crate::states::UnitSnapshot;

/// Short-lived aggregate of everything one pipeline run works on.
#[derive(Clone, Debug, Default)]
pub struct ExchangeContext {
    /// Units received with, or associated to, the current exchange, each
    /// with the processing outcome observed for it.
    pub received: Vec<UnitSnapshot>,
    /// Units chosen to be sent in the message under composition.
    pub sending: Vec<MessageUnit>,
    /// Errors generated during processing, awaiting classification; a
    /// synchronously reported error stays here until the response is built.
    pub generated_errors: Vec<ErrorMessage>,
    /// True only while actively composing the response to a request just
    /// received.
    pub response_channel_available: bool,
    /// Set when a classified error demands that a response be sent.
    pub response_needed: bool,
}

impl ExchangeContext {
    /// Creates an empty context for a new processing run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for a run that is composing a response to a
    /// request just received.
    pub fn with_response_channel() -> Self {
        Self {
            response_channel_available: true,
            ..Self::default()
        }
    }

    /// Associates a received unit (with its observed outcome) to this
    /// exchange.
    pub fn add_received(&mut self, snapshot: UnitSnapshot) {
        self.received.push(snapshot);
    }

    /// Records a unit chosen to be sent in the message under composition.
    pub fn add_sending(&mut self, unit: MessageUnit) {
        self.sending.push(unit);
    }

    /// Adds a freshly generated, not-yet-classified error.
    pub fn add_generated_error(&mut self, error: ErrorMessage) {
        self.generated_errors.push(error);
    }

    /// Removes a generated error from the pending-to-send set.
    pub fn remove_generated_error(&mut self, id: &MessageId) {
        self.generated_errors
            .retain(|e| &e.header.message_id != id);
    }

    /// Finds a unit of this exchange by id.
    pub fn find_unit(&self, id: &MessageId) -> Option<&UnitSnapshot> {
        self.received.iter().find(|s| s.id() == id)
    }
}
