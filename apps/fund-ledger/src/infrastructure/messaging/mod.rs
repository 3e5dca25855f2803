//! Event publishing adapters.

mod tracing_publisher;

pub use tracing_publisher::TracingEventPublisher;
