//! Structured logging setup.
//!
//! `RUST_LOG` wins over the configured level when set.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Error type for logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The level directive could not be parsed.
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter {
        /// Directive as configured.
        directive: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber was already installed.
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberError(String),
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns error if the filter is invalid or a subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidFilter {
            directive: config.level.clone(),
            message: e.to_string(),
        })?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };
    result.map_err(|e| LoggingError::SubscriberError(e.to_string()))?;

    tracing::info!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}
