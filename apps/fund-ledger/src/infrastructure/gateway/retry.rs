//! Exponential backoff with jitter for execution venue calls.
//!
//! | Retried | Not retried |
//! |---------|-------------|
//! | Connection failures | Venue rejection (an answer, not an error) |
//! | Attempt timeouts | HTTP 400/401/403 |
//! | HTTP 408, 429, 5xx | Unparseable response |

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Retry policy for venue calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Backoff cap.
    pub max_backoff: Duration,
    /// Multiplier applied per retry.
    pub backoff_multiplier: f64,
    /// Random spread applied to each backoff (0.2 = ±20%).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            backoff_multiplier: config.backoff_multiplier,
            jitter_factor: config.jitter_factor,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }
}

/// Backoff calculator for one logical request.
#[derive(Debug)]
pub struct ExponentialBackoff {
    retries: u32,
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
    backoff_multiplier: f64,
    jitter_factor: f64,
}

impl ExponentialBackoff {
    /// Create a calculator from a policy.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(policy: &RetryPolicy) -> Self {
        Self {
            retries: 0,
            max_retries: policy.max_attempts.saturating_sub(1),
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
            jitter_factor: policy.jitter_factor,
        }
    }

    /// Delay before the next retry, or `None` once the attempts are used up.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries >= self.max_retries {
            return None;
        }

        let base_ms = self.base_backoff_ms();
        let capped_ms = self.apply_jitter(base_ms).min(self.max_backoff_ms);
        self.retries += 1;

        Some(Duration::from_millis(capped_ms))
    }

    /// Attempts made so far, counting the first.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.retries + 1
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    fn base_backoff_ms(&self) -> u64 {
        let multiplier = self.backoff_multiplier.powi(self.retries as i32);
        let backoff = (self.initial_backoff_ms as f64 * multiplier) as u64;
        backoff.min(self.max_backoff_ms)
    }

    /// Uniform in `[backoff * (1 - jitter), backoff * (1 + jitter)]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn apply_jitter(&self, backoff_ms: u64) -> u64 {
        if self.jitter_factor <= 0.0 || backoff_ms == 0 {
            return backoff_ms;
        }
        let spread = backoff_ms as f64 * self.jitter_factor;
        let min = (backoff_ms as f64 - spread).max(0.0);
        let max = backoff_ms as f64 + spread;
        rand::rng().random_range(min..=max) as u64
    }
}

/// Whether an HTTP status from the venue is worth retrying.
#[must_use]
pub const fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}
