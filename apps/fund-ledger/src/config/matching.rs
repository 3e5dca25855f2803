//! Matching scheduler configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Matching scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Run the periodic scheduler.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Period between matching cycles in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Forward buy legs to the execution venue after each cycle.
    #[serde(default)]
    pub auto_dispatch: bool,
    /// Older unsent pairs retried per cycle when auto-dispatch is on.
    #[serde(default = "default_dispatch_batch_size")]
    pub dispatch_batch_size: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: default_interval_ms(),
            auto_dispatch: false,
            dispatch_batch_size: default_dispatch_batch_size(),
        }
    }
}

const fn default_interval_ms() -> u64 {
    1000
}

const fn default_dispatch_batch_size() -> usize {
    50
}
