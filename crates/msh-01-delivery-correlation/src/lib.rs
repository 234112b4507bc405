//! # Delivery Outcome Correlator Subsystem
//!
//! Tracks what happened to every unit included in a transmitted message,
//! and applies inbound Receipt/Error signals to the units they reference.
//!
//! ## Send-Outcome Rules
//!
//! | Unit kind | Transport success | Transport failure |
//! |-----------|-------------------|-------------------|
//! | UserMessage, receipt expected | `AwaitingReceipt` | `TransportFailure` |
//! | UserMessage, no receipt expected | `Delivered` | `TransportFailure` |
//! | Receipt / ErrorMessage | `Delivered` | `TransportFailure` |
//! | PullRequest | `Done` | `TransportFailure` |
//!
//! `TransportFailure` units are eligible for retry by the outbound
//! pipeline; the retry policy itself lives outside this subsystem.
//!
//! ## Inbound-Signal Rules
//!
//! | Signal | Reference resolves to | Referenced unit | Signal |
//! |--------|----------------------|-----------------|--------|
//! | Receipt | unit in `AwaitingReceipt` | `Delivered` | `ReadyForDelivery` |
//! | Receipt | unit in any other state | unchanged | `Warning`, `Done` (duplicate) |
//! | Receipt | nothing | - | `Failure` + processing error raised |
//! | Error | known unit | `Failure` | `ReadyForDelivery` |
//! | Error | nothing | - | `Failure` |
//!
//! ## Module Structure
//!
//! ```text
//! domain/transport.rs   - TransportResult, SignalOutcome value objects
//! domain/errors.rs      - CorrelationError
//! ports/inbound.rs      - CorrelationApi trait
//! service.rs            - CorrelationService (ledger + policies + bus)
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{CorrelationError, SignalOutcome, TransportResult};
pub use ports::CorrelationApi;
pub use service::CorrelationService;
