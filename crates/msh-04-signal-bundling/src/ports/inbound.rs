//! # Inbound Port - SignalBundlingApi
//!
//! Primary driving port of the Signal Bundling Selector, consumed by the
//! outbound composition stage.

use async_trait::async_trait;
use shared_types::{ErrorMessage, ExchangeContext, MessageUnit, UnitSnapshot};

use crate::domain::BundlingError;

/// Primary API for signal bundling.
#[async_trait]
pub trait SignalBundlingApi: Send + Sync {
    /// Outbound-initiation mode: selects the pending signals that ride
    /// along on a message whose primary unit is `primary`.
    ///
    /// Selection is read-only; the chosen signals transition to `Sending`
    /// only when the composed message actually goes out.
    fn select_for_outbound(
        &self,
        primary: &MessageUnit,
    ) -> Result<Vec<UnitSnapshot>, BundlingError>;

    /// Response-construction mode: picks the one error of this exchange's
    /// batch that goes into the response, failing all others immediately.
    async fn select_for_response(
        &self,
        context: &mut ExchangeContext,
    ) -> Result<Option<ErrorMessage>, BundlingError>;
}
