//! Core configuration.

use serde::{Deserialize, Serialize};
use shared_types::DEFAULT_MPC;

/// Configuration of the MSH core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MshConfig {
    /// Partition channel assigned to units that name none.
    pub default_mpc: String,
    /// Retry bound for contended ledger appends.
    pub max_append_attempts: u32,
    /// Selection-round bound for contended pull claims. Must exceed the
    /// number of messages plausibly waiting on one channel under heavy
    /// concurrent pulling.
    pub max_claim_rounds: u32,
    /// Event bus buffer per subscriber.
    pub bus_capacity: usize,
}

impl Default for MshConfig {
    fn default() -> Self {
        Self {
            default_mpc: DEFAULT_MPC.to_string(),
            max_append_attempts: shared_ledger::DEFAULT_MAX_APPEND_ATTEMPTS,
            max_claim_rounds: 64,
            bus_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl MshConfig {
    /// Parses a configuration from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
