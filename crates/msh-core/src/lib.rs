//! # MSH Core - Composition Root
//!
//! Wires the processing subsystems into one Message Service Handler core
//! and exposes the pipeline entry points that transport and security hosts
//! drive:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        Msh (container)                        │
//! │                                                               │
//! │  submit() ── ledger ──→ AwaitingPull / ReadyToPush            │
//! │  received() ──→ correlation (signals) / hand-off (messages)   │
//! │  pulled() ──→ pull resolution (atomic claim)                  │
//! │  sending() / transport_result() ──→ delivery correlation      │
//! │  classify_errors() ──→ error reporting policy engine          │
//! │  bundle_for() / build_response() ──→ signal bundling          │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything protocol-specific (wire format, transport, crypto) stays
//! outside; the container operates purely on message units, the ledger,
//! and exchange policies.

pub mod config;
pub mod container;

pub use config::MshConfig;
pub use container::{CoreError, Msh, ReceivedOutcome};

// The value objects hosts exchange with the pipeline entry points
pub use msh_01_delivery_correlation::{SignalOutcome, TransportResult};
pub use msh_03_error_reporting::Disposition;

/// Initializes `tracing` with an env-filter subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
