//! Domain events for matching and dispatch.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{FundId, PairId, Timestamp, TransactionId, Units, VenueOrderId};

/// All matching events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchingEvent {
    /// A pair was recorded.
    PairMatched(PairMatched),
    /// A pair's buy leg was accepted by the venue.
    PairDispatched(PairDispatched),
}

impl MatchingEvent {
    /// Get the pair ID for this event.
    #[must_use]
    pub const fn pair_id(&self) -> &PairId {
        match self {
            Self::PairMatched(e) => &e.pair_id,
            Self::PairDispatched(e) => &e.pair_id,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::PairMatched(_) => "PAIR_MATCHED",
            Self::PairDispatched(_) => "PAIR_DISPATCHED",
        }
    }
}

/// Event: pair recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairMatched {
    /// Pair ID.
    pub pair_id: PairId,
    /// Fund.
    pub fund: FundId,
    /// Buy leg.
    pub buy_transaction: TransactionId,
    /// Sell leg.
    pub sell_transaction: TransactionId,
    /// Matched quantity.
    pub matched_quantity: Units,
    /// Event timestamp.
    pub occurred_at: Timestamp,
}

/// Event: buy leg accepted by the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairDispatched {
    /// Pair ID.
    pub pair_id: PairId,
    /// Venue order ID.
    pub venue_order_id: VenueOrderId,
    /// Event timestamp.
    pub occurred_at: Timestamp,
}

impl From<&super::MatchedOrderPair> for PairMatched {
    fn from(pair: &super::MatchedOrderPair) -> Self {
        Self {
            pair_id: pair.id().clone(),
            fund: pair.fund().clone(),
            buy_transaction: pair.buy_transaction().clone(),
            sell_transaction: pair.sell_transaction().clone(),
            matched_quantity: pair.matched_quantity(),
            occurred_at: pair.created_at(),
        }
    }
}
