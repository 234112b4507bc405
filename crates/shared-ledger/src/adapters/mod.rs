//! Storage adapters for the Processing State Ledger.

pub mod in_memory;

pub use in_memory::InMemoryMessageStore;
