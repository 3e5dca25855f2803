//! Ledger unit-of-work configuration.

use serde::{Deserialize, Serialize};

/// Ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Times a settlement is retried after a version conflict.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

const fn default_max_conflict_retries() -> u32 {
    3
}
