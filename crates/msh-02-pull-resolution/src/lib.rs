//! # Pull Request Resolver Subsystem
//!
//! Resolves which waiting outbound UserMessage a Pull Request may claim.
//!
//! Claiming is the one true race of the core: two partners may pull the
//! same channel at the same moment. Selection and claim are therefore a
//! single conditional append: the resolver appends `Processing` at the
//! sequence number it observed during selection, so the loser's append is
//! rejected by the ledger and the loser re-selects. A claimed unit can
//! never be handed out twice.
//!
//! ```text
//! select oldest AwaitingPull ──append(Processing @ observed seq)──→ claimed
//!         ↑                                  │
//!         └────────── Conflict (lost race) ──┘
//! ```

pub mod domain;
pub mod ports;

pub use domain::{PullResolver, ResolutionError, DEFAULT_MAX_CLAIM_ROUNDS};
pub use ports::PullResolutionApi;
