//! # Inbound Port - ErrorReportingApi
//!
//! Primary driving port of the Error Reporting Policy Engine, consumed by
//! both pipelines for every error generated during processing.

use async_trait::async_trait;
use shared_types::{ErrorMessage, ExchangeContext};

use crate::domain::{Disposition, ReportingError};

/// Primary API for error-reporting classification.
#[async_trait]
pub trait ErrorReportingApi: Send + Sync {
    /// Classifies a newly generated error and applies the decision's
    /// effects to the ledger and the context.
    ///
    /// Applied once per error, before it leaves `Processing`.
    async fn report(
        &self,
        error: &ErrorMessage,
        context: &mut ExchangeContext,
    ) -> Result<Disposition, ReportingError>;
}
