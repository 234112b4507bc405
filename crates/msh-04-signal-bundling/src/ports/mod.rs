//! Ports for the Signal Bundling Selector.

pub mod inbound;

pub use inbound::SignalBundlingApi;
