//! # Signal Bundling Selector Subsystem
//!
//! Chooses which pending signal(s) ride along on an outgoing message. The
//! protocol allows at most one signal of each kind per message, so when
//! several qualify someone has to pick - and the two pipeline moments pick
//! by different rules.
//!
//! ## Outbound-Initiation Mode
//!
//! Candidates are pending signals (`ReadyToPush` or `TransportFailure`)
//! whose resolved destination equals the primary unit's destination and
//! whose policy permits bundling. Per signal kind the numerically oldest
//! by creation timestamp wins; the rest stay pending, eligible next round.
//!
//! ## Response-Construction Mode
//!
//! Among errors generated while processing one received request, priority
//! highest first: (1) no reference, (2) references the received
//! UserMessage, (3) references the received PullRequest, (4) references a
//! Receipt or another Error. The winner goes into the response; every
//! other error of the batch moves to `Failure` - once the response is
//! sent there is no further opportunity to deliver them.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{pick_oldest_per_kind, prioritize_response_errors, BundlingError};
pub use ports::SignalBundlingApi;
pub use service::BundlingService;
