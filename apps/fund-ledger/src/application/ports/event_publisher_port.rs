//! Event Publisher Port (Driven Port)
//!
//! Interface for publishing domain events to external systems.

use async_trait::async_trait;

use crate::domain::matching::MatchingEvent;
use crate::domain::transaction::TransactionEvent;

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// Connection error.
    #[error("Event publish connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Serialization error.
    #[error("Event serialization error: {message}")]
    SerializationError {
        /// Error details.
        message: String,
    },
}

/// Port for publishing domain events.
///
/// Publishing happens after a unit of work commits; a failure is logged by
/// the caller and never rolls the commit back.
#[async_trait]
pub trait EventPublisherPort: Send + Sync {
    /// Publish transaction events.
    async fn publish_transaction_events(
        &self,
        events: Vec<TransactionEvent>,
    ) -> Result<(), EventPublishError>;

    /// Publish matching events.
    async fn publish_matching_events(
        &self,
        events: Vec<MatchingEvent>,
    ) -> Result<(), EventPublishError>;
}

/// No-op event publisher.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisherPort for NoOpEventPublisher {
    async fn publish_transaction_events(
        &self,
        _events: Vec<TransactionEvent>,
    ) -> Result<(), EventPublishError> {
        Ok(())
    }

    async fn publish_matching_events(
        &self,
        _events: Vec<MatchingEvent>,
    ) -> Result<(), EventPublishError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::{FundId, InvestorId, Timestamp, TransactionId};
    use crate::domain::transaction::TransactionCancelled;

    #[tokio::test]
    async fn no_op_publisher_succeeds() {
        let publisher = NoOpEventPublisher;
        let event = TransactionEvent::Cancelled(TransactionCancelled {
            transaction_id: TransactionId::new("txn-1"),
            investor: InvestorId::new("inv-1"),
            fund: FundId::new("fund-a"),
            reversed: false,
            occurred_at: Timestamp::now(),
        });

        assert!(publisher.publish_transaction_events(vec![event]).await.is_ok());
        assert!(publisher.publish_matching_events(vec![]).await.is_ok());
    }
}
