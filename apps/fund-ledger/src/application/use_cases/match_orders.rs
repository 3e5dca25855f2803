//! Match Orders Use Case
//!
//! One matching cycle: for each fund with pending purchases or sells, pair
//! outstanding quantity FIFO and record the pairs. Runs for the same fund are
//! serialized by a per-fund async lock, and the repository re-checks every
//! transaction's quantity limit on insert, so concurrent cycles can never
//! pair the same quantity twice.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::application::ports::EventPublisherPort;
use crate::domain::matching::{
    MatchedOrderPair, MatchedPairRepository, MatchingEvent, OrderMatcher, PairMatched,
    QuantityLimit,
};
use crate::domain::shared::{FundId, Timestamp, TransactionId};
use crate::domain::transaction::LedgerRepository;
use crate::error::LedgerError;
use crate::observability::record_matching_cycle;

/// Use case for running matching cycles.
pub struct MatchOrdersUseCase<L, P, E>
where
    L: LedgerRepository,
    P: MatchedPairRepository,
    E: EventPublisherPort,
{
    ledger: Arc<L>,
    pairs: Arc<P>,
    event_publisher: Arc<E>,
    fund_locks: Mutex<HashMap<FundId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<L, P, E> MatchOrdersUseCase<L, P, E>
where
    L: LedgerRepository,
    P: MatchedPairRepository,
    E: EventPublisherPort,
{
    /// Create a new `MatchOrdersUseCase`.
    pub fn new(ledger: Arc<L>, pairs: Arc<P>, event_publisher: Arc<E>) -> Self {
        Self {
            ledger,
            pairs,
            event_publisher,
            fund_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run one matching cycle, for one fund or for every fund with pending
    /// orders. Returns the pairs created by this cycle.
    ///
    /// Matching only proposes pairs; no transaction changes state.
    ///
    /// # Errors
    ///
    /// Returns a storage error if pending transactions or matched
    /// quantities cannot be read.
    pub async fn run_matching_cycle(
        &self,
        fund: Option<&FundId>,
    ) -> Result<Vec<MatchedOrderPair>, LedgerError> {
        let started = Instant::now();

        // 1. Fund groups with matchable pending orders
        let funds: BTreeSet<FundId> = match fund {
            Some(f) => BTreeSet::from([f.clone()]),
            None => self
                .ledger
                .find_pending(None)
                .await?
                .iter()
                .filter(|tx| tx.transaction_type().is_matchable())
                .map(|tx| tx.fund().clone())
                .collect(),
        };

        // 2. Pair each group under its lock
        let mut created = Vec::new();
        for fund_id in &funds {
            let lock = self.fund_lock(fund_id);
            let _guard = lock.lock().await;

            match self.match_fund(fund_id).await {
                Ok(pairs) => created.extend(pairs),
                Err(e) if e.code().is_retryable() => {
                    tracing::warn!(fund = %fund_id, "Matching skipped until next cycle: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        record_matching_cycle(funds.len(), created.len(), started.elapsed().as_secs_f64());
        tracing::debug!(funds = funds.len(), pairs = created.len(), "Matching cycle finished");

        if created.is_empty() {
            return Ok(created);
        }

        // 3. Publish events
        let events: Vec<MatchingEvent> = created
            .iter()
            .map(|p| MatchingEvent::PairMatched(PairMatched::from(p)))
            .collect();
        if let Err(e) = self.event_publisher.publish_matching_events(events).await {
            tracing::error!("Failed to publish matching events: {}", e);
        }

        Ok(created)
    }

    async fn match_fund(&self, fund: &FundId) -> Result<Vec<MatchedOrderPair>, LedgerError> {
        // Re-read under the lock so pairs recorded by a previous run are seen
        let pending = self.ledger.find_pending(Some(fund)).await?;
        let ids: Vec<TransactionId> = pending
            .iter()
            .filter(|tx| tx.transaction_type().is_matchable())
            .map(|tx| tx.id().clone())
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let matched = self.pairs.matched_quantities(&ids).await?;
        let pairs = OrderMatcher::match_fund(fund, &pending, &matched, Timestamp::now())?;
        if pairs.is_empty() {
            return Ok(pairs);
        }

        let limits: Vec<QuantityLimit> = pending
            .iter()
            .filter(|tx| pairs.iter().any(|p| p.references(tx.id())))
            .map(|tx| QuantityLimit {
                transaction_id: tx.id().clone(),
                units: tx.units(),
            })
            .collect();
        self.pairs.insert_pairs(&pairs, &limits).await?;

        for pair in &pairs {
            tracing::debug!(
                pair_id = %pair.id(),
                fund = %fund,
                buy = %pair.buy_transaction(),
                sell = %pair.sell_transaction(),
                quantity = %pair.matched_quantity(),
                "Pair matched"
            );
        }
        Ok(pairs)
    }

    fn fund_lock(&self, fund: &FundId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .fund_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(fund.clone()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NoOpEventPublisher;
    use crate::domain::fund::{Fund, NewFund};
    use crate::domain::pricing::FeeSchedule;
    use crate::domain::shared::{InvestorId, Money, Units};
    use crate::domain::transaction::{SubmitTransactionCommand, Transaction, TransactionType};
    use crate::infrastructure::persistence::{
        InMemoryLedgerRepository, InMemoryMatchedPairRepository,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    type UseCase =
        MatchOrdersUseCase<InMemoryLedgerRepository, InMemoryMatchedPairRepository, NoOpEventPublisher>;

    struct Fixture {
        ledger: Arc<InMemoryLedgerRepository>,
        pairs: Arc<InMemoryMatchedPairRepository>,
        use_case: Arc<UseCase>,
    }

    async fn fixture() -> Fixture {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        for id in ["fund-a", "fund-b"] {
            let fund = Fund::new(NewFund {
                id: FundId::new(id),
                ticker: id.to_uppercase(),
                currency: "IDR".to_string(),
                current_nav: Money::new(dec!(1000)),
                previous_nav: None,
            })
            .unwrap();
            ledger.upsert_fund(&fund).await.unwrap();
        }
        let pairs = Arc::new(InMemoryMatchedPairRepository::new());
        let use_case = Arc::new(MatchOrdersUseCase::new(
            Arc::clone(&ledger),
            Arc::clone(&pairs),
            Arc::new(NoOpEventPublisher),
        ));
        Fixture {
            ledger,
            pairs,
            use_case,
        }
    }

    async fn pending(
        ledger: &InMemoryLedgerRepository,
        kind: TransactionType,
        fund: &str,
        units: Decimal,
        offset_ms: i64,
    ) -> TransactionId {
        let base = Timestamp::parse("2026-01-19T09:00:00Z").unwrap();
        let tx = Transaction::submit_at(
            SubmitTransactionCommand {
                investor: InvestorId::new("inv-1"),
                fund: FundId::new(fund),
                transaction_type: kind,
                units: Units::new(units),
                price_per_unit: Money::new(dec!(1000)),
                destination: None,
                document_reference: None,
            },
            &FeeSchedule::default(),
            base.plus_millis(offset_ms),
        )
        .unwrap();
        ledger.insert_transaction(&tx).await.unwrap();
        tx.id().clone()
    }

    #[tokio::test]
    async fn one_buy_against_two_sells() {
        let f = fixture().await;
        let buy = pending(&f.ledger, TransactionType::Purchase, "fund-a", dec!(100), 0).await;
        let older = pending(&f.ledger, TransactionType::Sell, "fund-a", dec!(60), 10).await;
        let newer = pending(&f.ledger, TransactionType::Sell, "fund-a", dec!(40), 20).await;

        let pairs = f.use_case.run_matching_cycle(None).await.unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].sell_transaction(), &older);
        assert_eq!(pairs[0].matched_quantity().amount(), dec!(60));
        assert_eq!(pairs[1].sell_transaction(), &newer);
        assert_eq!(pairs[1].matched_quantity().amount(), dec!(40));
        assert!(pairs.iter().all(|p| p.buy_transaction() == &buy));

        let totals = f.pairs.matched_quantities(&[buy.clone()]).await.unwrap();
        assert_eq!(totals[&buy].amount(), dec!(100));
    }

    #[tokio::test]
    async fn second_cycle_matches_only_new_quantity() {
        let f = fixture().await;
        pending(&f.ledger, TransactionType::Purchase, "fund-a", dec!(100), 0).await;
        pending(&f.ledger, TransactionType::Sell, "fund-a", dec!(60), 10).await;
        assert_eq!(f.use_case.run_matching_cycle(None).await.unwrap().len(), 1);

        assert!(f.use_case.run_matching_cycle(None).await.unwrap().is_empty());

        pending(&f.ledger, TransactionType::Sell, "fund-a", dec!(70), 20).await;
        let pairs = f.use_case.run_matching_cycle(None).await.unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].matched_quantity().amount(), dec!(40));
    }

    #[tokio::test]
    async fn funds_are_matched_independently() {
        let f = fixture().await;
        pending(&f.ledger, TransactionType::Purchase, "fund-a", dec!(5), 0).await;
        pending(&f.ledger, TransactionType::Sell, "fund-b", dec!(5), 10).await;

        assert!(f.use_case.run_matching_cycle(None).await.unwrap().is_empty());

        pending(&f.ledger, TransactionType::Sell, "fund-a", dec!(5), 20).await;
        let only_b = f
            .use_case
            .run_matching_cycle(Some(&FundId::new("fund-b")))
            .await
            .unwrap();
        assert!(only_b.is_empty());
        let pairs = f
            .use_case
            .run_matching_cycle(Some(&FundId::new("fund-a")))
            .await
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].fund().as_str(), "fund-a");
    }

    #[tokio::test]
    async fn one_sided_book_creates_no_pairs() {
        let f = fixture().await;
        pending(&f.ledger, TransactionType::Purchase, "fund-a", dec!(5), 0).await;

        let pairs = f.use_case.run_matching_cycle(None).await.unwrap();
        assert!(pairs.is_empty());
        assert!(f.pairs.is_empty());
    }

    #[tokio::test]
    async fn concurrent_cycles_never_double_match() {
        let f = fixture().await;
        let buy = pending(&f.ledger, TransactionType::Purchase, "fund-a", dec!(100), 0).await;
        pending(&f.ledger, TransactionType::Sell, "fund-a", dec!(100), 10).await;

        let (a, b) = tokio::join!(
            f.use_case.run_matching_cycle(None),
            f.use_case.run_matching_cycle(None)
        );

        assert_eq!(a.unwrap().len() + b.unwrap().len(), 1);
        let totals = f.pairs.matched_quantities(&[buy.clone()]).await.unwrap();
        assert_eq!(totals[&buy].amount(), dec!(100));
    }
}
