//! Configuration module for the fund ledger.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before anything is wired.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fund_ledger::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! println!("matching every {}ms", config.matching.interval_ms);
//! ```

mod gateway;
mod ledger;
mod matching;
mod observability;
mod pricing;
mod seed;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gateway::{GatewayConfig, GatewayMode, RetryConfig};
pub use ledger::LedgerConfig;
pub use matching::MatchingConfig;
pub use observability::{LoggingConfig, MetricsConfig, ObservabilityConfig};
pub use pricing::{FeeTierConfig, PricingConfig};
pub use seed::FundSeed;

/// Default config path when `FUND_LEDGER_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Matching scheduler.
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Execution venue.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Price step and fee bands.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Settlement unit of work.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Funds registered at startup.
    #[serde(default)]
    pub funds: Vec<FundSeed>,
    /// Investor ID to venue account ID.
    #[serde(default)]
    pub accounts: BTreeMap<String, String>,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.matching.interval_ms == 0 {
        return invalid("matching.interval_ms must be positive");
    }

    if config.pricing.price_step <= Decimal::ZERO {
        return invalid("pricing.price_step must be positive");
    }
    if let Err(e) = config.pricing.fee_schedule() {
        return Err(ConfigError::ValidationError(format!("pricing.fee_tiers: {e}")));
    }

    let gateway = &config.gateway;
    if gateway.timeout_ms == 0 {
        return invalid("gateway.timeout_ms must be positive");
    }
    if gateway.retry.max_attempts == 0 {
        return invalid("gateway.retry.max_attempts must be at least 1");
    }
    if !(0.0..=1.0).contains(&gateway.retry.jitter_factor) {
        return invalid("gateway.retry.jitter_factor must be between 0.0 and 1.0");
    }
    if gateway.retry.backoff_multiplier < 1.0 {
        return invalid("gateway.retry.backoff_multiplier must be at least 1.0");
    }
    if gateway.mode == GatewayMode::Http && gateway.base_url.trim().is_empty() {
        return invalid("gateway.base_url is required in http mode");
    }

    if config.observability.metrics.enabled
        && config
            .observability
            .metrics
            .listen_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        return invalid("observability.metrics.listen_address must be host:port");
    }

    for fund in &config.funds {
        if let Err(e) = fund.to_fund() {
            return Err(ConfigError::ValidationError(format!("funds[{}]: {e}", fund.id)));
        }
    }

    Ok(())
}

const fn default_true() -> bool {
    true
}
