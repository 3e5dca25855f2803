//! Matched order pair entity.

use serde::{Deserialize, Serialize};

use super::MatchingError;
use crate::domain::shared::{FundId, PairId, Timestamp, TransactionId, Units, VenueOrderId};

/// A proposed pairing of one buy and one sell transaction in the same fund.
///
/// Only the sent flag ever changes, and only from unsent to sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedOrderPair {
    id: PairId,
    fund: FundId,
    buy_transaction: TransactionId,
    sell_transaction: TransactionId,
    matched_quantity: Units,
    created_at: Timestamp,
    sent_to_exchange: bool,
    sent_to_exchange_at: Option<Timestamp>,
    venue_order_id: Option<VenueOrderId>,
}

impl MatchedOrderPair {
    /// Create an unsent pair.
    ///
    /// # Errors
    ///
    /// Returns error if the matched quantity is not positive.
    pub fn new(
        fund: FundId,
        buy_transaction: TransactionId,
        sell_transaction: TransactionId,
        matched_quantity: Units,
        created_at: Timestamp,
    ) -> Result<Self, MatchingError> {
        if !matched_quantity.is_positive() {
            return Err(MatchingError::InvalidQuantity {
                quantity: matched_quantity.to_string(),
            });
        }
        Ok(Self {
            id: PairId::generate(),
            fund,
            buy_transaction,
            sell_transaction,
            matched_quantity,
            created_at,
            sent_to_exchange: false,
            sent_to_exchange_at: None,
            venue_order_id: None,
        })
    }

    /// Get the pair ID.
    #[must_use]
    pub const fn id(&self) -> &PairId {
        &self.id
    }

    /// Get the fund.
    #[must_use]
    pub const fn fund(&self) -> &FundId {
        &self.fund
    }

    /// Get the buy leg.
    #[must_use]
    pub const fn buy_transaction(&self) -> &TransactionId {
        &self.buy_transaction
    }

    /// Get the sell leg.
    #[must_use]
    pub const fn sell_transaction(&self) -> &TransactionId {
        &self.sell_transaction
    }

    /// Get the matched quantity.
    #[must_use]
    pub const fn matched_quantity(&self) -> Units {
        self.matched_quantity
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns true once the buy leg was accepted by the venue.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        self.sent_to_exchange
    }

    /// When the buy leg was accepted.
    #[must_use]
    pub const fn sent_to_exchange_at(&self) -> Option<Timestamp> {
        self.sent_to_exchange_at
    }

    /// Venue order ID assigned on acceptance.
    #[must_use]
    pub const fn venue_order_id(&self) -> Option<&VenueOrderId> {
        self.venue_order_id.as_ref()
    }

    /// Returns true if the pair references `transaction` on either leg.
    #[must_use]
    pub fn references(&self, transaction: &TransactionId) -> bool {
        &self.buy_transaction == transaction || &self.sell_transaction == transaction
    }

    /// Record venue acceptance. The timestamp is set once.
    ///
    /// # Errors
    ///
    /// Returns `AlreadySent` if the pair was already marked.
    pub fn mark_sent(
        &mut self,
        venue_order_id: VenueOrderId,
        at: Timestamp,
    ) -> Result<(), MatchingError> {
        if self.sent_to_exchange {
            return Err(MatchingError::AlreadySent {
                pair_id: self.id.to_string(),
            });
        }
        self.sent_to_exchange = true;
        self.sent_to_exchange_at = Some(at);
        self.venue_order_id = Some(venue_order_id);
        Ok(())
    }
}
