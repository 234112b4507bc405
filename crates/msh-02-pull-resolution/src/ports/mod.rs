//! Ports for the Pull Request Resolver.

pub mod inbound;

pub use inbound::PullResolutionApi;
