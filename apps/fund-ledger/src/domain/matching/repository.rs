//! Matched Pair Repository Trait

use std::collections::HashMap;

use async_trait::async_trait;

use super::MatchedOrderPair;
use crate::domain::shared::{PairId, RepositoryError, Timestamp, TransactionId, Units, VenueOrderId};

/// Upper bound on the total matched quantity of one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityLimit {
    /// Transaction ID.
    pub transaction_id: TransactionId,
    /// The transaction's units.
    pub units: Units,
}

/// Repository trait for matched pairs.
#[async_trait]
pub trait MatchedPairRepository: Send + Sync {
    /// Insert pairs atomically.
    ///
    /// For every limit, the stored matched quantity plus the new pairs' share
    /// must not exceed `units`; otherwise nothing is inserted.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a limit would be exceeded.
    async fn insert_pairs(
        &self,
        pairs: &[MatchedOrderPair],
        limits: &[QuantityLimit],
    ) -> Result<(), RepositoryError>;

    /// Find a pair by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_pair(&self, id: &PairId) -> Result<Option<MatchedOrderPair>, RepositoryError>;

    /// Mark a pair sent if it is not already.
    ///
    /// Returns `false` when the pair was already sent (nothing changes).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the pair does not exist.
    async fn mark_sent(
        &self,
        id: &PairId,
        venue_order_id: VenueOrderId,
        at: Timestamp,
    ) -> Result<bool, RepositoryError>;

    /// Total matched quantity per transaction, for the given IDs.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn matched_quantities(
        &self,
        ids: &[TransactionId],
    ) -> Result<HashMap<TransactionId, Units>, RepositoryError>;

    /// Take a pair out of automatic dispatch after a failure that retrying
    /// cannot fix. The pair stays unsent and can still be dispatched by ID.
    ///
    /// Returns `false` when the pair was already sent (nothing changes).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the pair does not exist.
    async fn park(&self, id: &PairId, reason: &str) -> Result<bool, RepositoryError>;

    /// Unsent, unparked pairs in insertion order, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_unsent(&self, limit: usize) -> Result<Vec<MatchedOrderPair>, RepositoryError>;

    /// Pairs referencing a transaction on either leg.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn pairs_for_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<Vec<MatchedOrderPair>, RepositoryError>;
}
