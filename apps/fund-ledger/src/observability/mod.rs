//! Observability module for metrics and logging.
//!
//! Structured logs go through `tracing`; counters and histograms through the
//! `metrics` facade, optionally exported to Prometheus.

mod logging;
mod metrics;

pub use logging::{LoggingError, init_logging};
pub use metrics::{
    MetricsError, init_metrics, record_concurrency_retry, record_dispatch_outcome,
    record_gateway_attempt, record_matching_cycle, record_settlement, record_submission,
};
