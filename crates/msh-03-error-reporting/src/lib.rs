//! # Error Reporting Policy Engine Subsystem
//!
//! Decides, once per newly generated error, whether it is reported in the
//! current response, pushed later, or suppressed. Ambiguity is data here:
//! an unresolvable policy is handled by fail-safe rules, never thrown.
//!
//! ## Decision Procedure
//!
//! | Referenced unit | Policy pattern | Response channel | Disposition |
//! |-----------------|----------------|------------------|-------------|
//! | PullRequest | any | any | Synchronous |
//! | UserMessage / signal | async push | any | Asynchronous |
//! | UserMessage / signal | sync response or none | any | Synchronous |
//! | UserMessage / signal | policy unresolvable | available | Synchronous |
//! | UserMessage / signal | policy unresolvable | unavailable | Suppressed |
//! | none (general error) | - | all siblings failed | Synchronous |
//! | none (general error) | - | mixed outcomes | Suppressed |
//!
//! ## Effects
//!
//! - `Synchronous` keeps the error in the exchange's pending-to-send set
//!   and demands a response (`response_needed = true`).
//! - `Asynchronous` queues the error on its own ledger (`ReadyToPush`).
//! - `Suppressed` closes the error (`Warning`, then `Done`) - logged for
//!   audit, never transmitted.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{classify, Disposition, ReportingError};
pub use ports::ErrorReportingApi;
pub use service::ReportingService;
