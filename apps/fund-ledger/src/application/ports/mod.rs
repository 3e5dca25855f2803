//! Application Ports (Driven)
//!
//! Ports define how the ledger reaches external collaborators.

mod account_directory_port;
mod event_publisher_port;
mod execution_gateway_port;
mod nav_provider_port;

pub use account_directory_port::{AccountDirectoryError, AccountDirectoryPort};
pub use event_publisher_port::{EventPublishError, EventPublisherPort, NoOpEventPublisher};
#[cfg(test)]
pub use execution_gateway_port::MockExecutionGatewayPort;
pub use execution_gateway_port::{
    ExecutionGatewayPort, GatewayAck, GatewayError, GatewayOrderRequest, OrderSide,
};
pub use nav_provider_port::{NavError, NavProviderPort};
