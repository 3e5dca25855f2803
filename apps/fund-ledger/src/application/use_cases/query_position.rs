//! Query Ledger Use Case
//!
//! Read-only lookups over positions, transactions and matched pairs.

use std::sync::Arc;

use crate::domain::matching::{MatchedOrderPair, MatchedPairRepository};
use crate::domain::position::{Position, PositionKey};
use crate::domain::shared::{InvestorId, TransactionId, Units};
use crate::domain::transaction::{LedgerRepository, Transaction};
use crate::error::LedgerError;

/// Use case for ledger queries.
pub struct QueryLedgerUseCase<L, P>
where
    L: LedgerRepository,
    P: MatchedPairRepository,
{
    ledger: Arc<L>,
    pairs: Arc<P>,
}

impl<L, P> QueryLedgerUseCase<L, P>
where
    L: LedgerRepository,
    P: MatchedPairRepository,
{
    /// Create a new `QueryLedgerUseCase`.
    pub const fn new(ledger: Arc<L>, pairs: Arc<P>) -> Self {
        Self { ledger, pairs }
    }

    /// Current position for `(investor, fund)`.
    ///
    /// An investor who never held the fund gets a zero position.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn get_position(&self, key: &PositionKey) -> Result<Position, LedgerError> {
        Ok(self
            .ledger
            .find_position(key)
            .await?
            .map_or_else(|| Position::empty(key.clone()), |v| v.value))
    }

    /// Every position an investor holds, ordered by fund.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn positions_for_investor(
        &self,
        investor: &InvestorId,
    ) -> Result<Vec<Position>, LedgerError> {
        Ok(self.ledger.positions_for_investor(investor).await?)
    }

    /// Look up a transaction.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` if no such transaction exists.
    pub async fn get_transaction(&self, id: &TransactionId) -> Result<Transaction, LedgerError> {
        self.ledger
            .find_transaction(id)
            .await?
            .map(|v| v.value)
            .ok_or_else(|| LedgerError::not_found("transaction", id.as_str()))
    }

    /// Quantity of a transaction already paired by matching.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn matched_quantity(&self, id: &TransactionId) -> Result<Units, LedgerError> {
        let totals = self.pairs.matched_quantities(std::slice::from_ref(id)).await?;
        Ok(totals.get(id).copied().unwrap_or(Units::ZERO))
    }

    /// Pairs referencing a transaction on either leg.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn pairs_for_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<Vec<MatchedOrderPair>, LedgerError> {
        Ok(self.pairs.pairs_for_transaction(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matching::QuantityLimit;
    use crate::domain::shared::{FundId, Timestamp};
    use crate::error::ErrorCode;
    use crate::infrastructure::persistence::{
        InMemoryLedgerRepository, InMemoryMatchedPairRepository,
    };
    use rust_decimal_macros::dec;

    fn setup() -> (
        Arc<InMemoryMatchedPairRepository>,
        QueryLedgerUseCase<InMemoryLedgerRepository, InMemoryMatchedPairRepository>,
    ) {
        let pairs = Arc::new(InMemoryMatchedPairRepository::new());
        let query = QueryLedgerUseCase::new(
            Arc::new(InMemoryLedgerRepository::new()),
            Arc::clone(&pairs),
        );
        (pairs, query)
    }

    #[tokio::test]
    async fn unknown_position_is_zero() {
        let (_, query) = setup();
        let key = PositionKey::new(InvestorId::new("inv-1"), FundId::new("fund-a"));

        let position = query.get_position(&key).await.unwrap();

        assert!(position.units().is_zero());
        assert!(position.amount().is_zero());
        assert_eq!(position.key(), &key);
    }

    #[tokio::test]
    async fn unknown_transaction_is_not_found() {
        let (_, query) = setup();

        let err = query
            .get_transaction(&TransactionId::new("missing"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn matched_quantity_sums_pairs() {
        let (pairs, query) = setup();
        let buy = TransactionId::new("buy-1");
        let mut created = Vec::new();
        for (sell, qty) in [("sell-1", dec!(60)), ("sell-2", dec!(40))] {
            created.push(
                MatchedOrderPair::new(
                    FundId::new("fund-a"),
                    buy.clone(),
                    TransactionId::new(sell),
                    Units::new(qty),
                    Timestamp::now(),
                )
                .unwrap(),
            );
        }
        let limits = [QuantityLimit {
            transaction_id: buy.clone(),
            units: Units::new(dec!(100)),
        }];
        pairs.insert_pairs(&created, &limits).await.unwrap();

        assert_eq!(query.matched_quantity(&buy).await.unwrap().amount(), dec!(100));
        assert!(query
            .matched_quantity(&TransactionId::new("other"))
            .await
            .unwrap()
            .is_zero());
        assert_eq!(query.pairs_for_transaction(&buy).await.unwrap().len(), 2);
    }
}
