//! Ports for the Error Reporting Policy Engine.

pub mod inbound;

pub use inbound::ErrorReportingApi;
