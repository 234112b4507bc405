//! Ports for the Processing State Ledger.

pub mod store;

pub use store::{MessageStore, StoreError};
