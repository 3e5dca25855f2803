//! Execution venue configuration.

use serde::{Deserialize, Serialize};

/// Which execution gateway adapter to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    /// In-process venue that accepts every order.
    #[default]
    Paper,
    /// Remote venue over HTTP.
    Http,
}

impl GatewayMode {
    /// Mode name, as written in config.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Http => "http",
        }
    }
}

/// Execution gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Adapter to use.
    #[serde(default)]
    pub mode: GatewayMode,
    /// Venue base URL (required in `http` mode).
    #[serde(default)]
    pub base_url: String,
    /// Venue API key, sent as a bearer token.
    #[serde(default)]
    pub api_key: String,
    /// Timeout for a single attempt in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retry policy for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: GatewayMode::Paper,
            base_url: String::new(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
            retry: RetryConfig::default(),
        }
    }
}

/// Exponential backoff settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the first retry in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Multiplier applied per retry.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Random spread applied to each backoff, in [0, 1].
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

const fn default_timeout_ms() -> u64 {
    5000
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    2000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_jitter_factor() -> f64 {
    0.2
}
