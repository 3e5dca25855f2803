//! Event publisher that writes each domain event as a structured log line.
//!
//! Events go to the `fund_ledger::events` target with the JSON payload in
//! the `payload` field, so a log shipper can route them without a broker.

use async_trait::async_trait;
use serde::Serialize;

use crate::application::ports::{EventPublishError, EventPublisherPort};
use crate::domain::matching::MatchingEvent;
use crate::domain::transaction::TransactionEvent;

/// Publishes domain events through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    /// Create a new publisher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn encode<T: Serialize>(event: &T) -> Result<String, EventPublishError> {
        serde_json::to_string(event).map_err(|e| EventPublishError::SerializationError {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl EventPublisherPort for TracingEventPublisher {
    async fn publish_transaction_events(
        &self,
        events: Vec<TransactionEvent>,
    ) -> Result<(), EventPublishError> {
        for event in &events {
            let payload = Self::encode(event)?;
            tracing::info!(
                target: "fund_ledger::events",
                event_type = event.event_type(),
                transaction_id = %event.transaction_id(),
                payload = %payload,
                "Domain event"
            );
        }
        Ok(())
    }

    async fn publish_matching_events(
        &self,
        events: Vec<MatchingEvent>,
    ) -> Result<(), EventPublishError> {
        for event in &events {
            let payload = Self::encode(event)?;
            tracing::info!(
                target: "fund_ledger::events",
                event_type = event.event_type(),
                pair_id = %event.pair_id(),
                payload = %payload,
                "Domain event"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matching::PairDispatched;
    use crate::domain::shared::{FundId, InvestorId, PairId, Timestamp, TransactionId, VenueOrderId};
    use crate::domain::transaction::TransactionCancelled;

    #[tokio::test]
    async fn publishes_both_event_kinds() {
        let publisher = TracingEventPublisher::new();
        let cancelled = TransactionEvent::Cancelled(TransactionCancelled {
            transaction_id: TransactionId::new("txn-1"),
            investor: InvestorId::new("inv-1"),
            fund: FundId::new("fund-a"),
            reversed: true,
            occurred_at: Timestamp::now(),
        });
        let dispatched = MatchingEvent::PairDispatched(PairDispatched {
            pair_id: PairId::new("pair-1"),
            venue_order_id: VenueOrderId::new("venue-1"),
            occurred_at: Timestamp::now(),
        });

        assert!(publisher.publish_transaction_events(vec![cancelled]).await.is_ok());
        assert!(publisher.publish_matching_events(vec![dispatched]).await.is_ok());
    }

    #[test]
    fn events_encode_with_type_tag() {
        let event = MatchingEvent::PairDispatched(PairDispatched {
            pair_id: PairId::new("pair-1"),
            venue_order_id: VenueOrderId::new("venue-1"),
            occurred_at: Timestamp::now(),
        });

        let payload = TracingEventPublisher::encode(&event).unwrap();

        assert!(payload.contains("\"type\":\"PAIR_DISPATCHED\""));
        assert!(payload.contains("\"venue_order_id\":\"venue-1\""));
    }
}
