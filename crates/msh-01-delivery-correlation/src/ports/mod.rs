//! Ports for the Delivery Outcome Correlator.

pub mod inbound;

pub use inbound::CorrelationApi;
