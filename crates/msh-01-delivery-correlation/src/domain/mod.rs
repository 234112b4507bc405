//! Domain layer of the Delivery Outcome Correlator.

pub mod errors;
pub mod transport;

pub use errors::CorrelationError;
pub use transport::{SignalOutcome, TransportResult};
