//! Execution venue adapters.
//!
//! - [`PaperExecutionGateway`]: in-process venue for paper trading and tests
//! - [`HttpExecutionGateway`]: REST venue client
//! - [`ResilientGateway`]: per-attempt timeout and retry around either
//! - [`ConfiguredGateway`]: whichever of the two `gateway.mode` selects

mod configured;
mod http;
mod paper;
mod resilient;
mod retry;

pub use configured::ConfiguredGateway;
pub use http::HttpExecutionGateway;
pub use paper::PaperExecutionGateway;
pub use resilient::ResilientGateway;
pub use retry::{ExponentialBackoff, RetryPolicy, is_retryable_status};
