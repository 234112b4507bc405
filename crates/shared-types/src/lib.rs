//! # Shared Types Crate
//!
//! This crate contains all domain entities shared across the MSH subsystems:
//! message units, processing states, exchange policies, and the per-exchange
//! processing context.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Tagged Unions**: `MessageUnit` is a closed enum; rule tables in the
//!   subsystem crates match on it exhaustively so the compiler checks them.
//! - **No Ambient State**: the per-exchange `ExchangeContext` is an explicit
//!   value passed into component calls, never thread-local.

pub mod context;
pub mod entities;
pub mod policy;
pub mod states;
pub mod time;

pub use context::ExchangeContext;
pub use entities::*;
pub use policy::*;
pub use states::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
