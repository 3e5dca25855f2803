//! Dispatch Pair Use Case
//!
//! Forwards the buy leg of a matched pair to the execution venue. The pair
//! is already persisted; no ledger lock is held while the venue call is in
//! flight. A pair is marked sent only on venue acceptance, and the stable
//! pair ID is the client reference, so a retry after a timeout is safe.
//!
//! A failure that a retry cannot fix (venue rejection, unmapped account,
//! buy leg no longer pending, missing fund or transaction) parks the pair:
//! it leaves the automatic queue and is only sent again on explicit request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::ports::{
    AccountDirectoryPort, EventPublisherPort, ExecutionGatewayPort, GatewayAck,
    GatewayOrderRequest,
};
use crate::domain::matching::{MatchedPairRepository, MatchingEvent, PairDispatched};
use crate::domain::shared::{PairId, RepositoryError, Timestamp, VenueOrderId};
use crate::domain::transaction::LedgerRepository;
use crate::error::{ErrorCode, LedgerError};
use crate::observability::record_dispatch_outcome;

/// Outcome of dispatching one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Venue accepted the buy leg; the pair is now marked sent.
    Sent {
        /// Venue order ID.
        venue_order_id: VenueOrderId,
    },
    /// The pair had already been sent; nothing was done.
    AlreadySent,
    /// Venue rejected the order; the pair stays unsent and is parked.
    Failed {
        /// Rejection reason from the venue.
        reason: String,
    },
}

impl DispatchOutcome {
    /// Metric label for the outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sent { .. } => "sent",
            Self::AlreadySent => "already_sent",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Why a dispatch result should take the pair out of automatic dispatch.
fn park_reason(result: &Result<DispatchOutcome, LedgerError>) -> Option<String> {
    match result {
        Ok(DispatchOutcome::Failed { reason }) => Some(format!("venue rejected: {reason}")),
        Ok(_) => None,
        Err(e) => match e.code() {
            ErrorCode::AccountNotMapped
            | ErrorCode::InvalidStateTransition
            | ErrorCode::NotFound => Some(format!("{}: {}", e.code(), e.message())),
            _ => None,
        },
    }
}

/// Per-pair result of a batch dispatch.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// Pair ID.
    pub pair_id: PairId,
    /// Outcome, or the error that stopped this pair.
    pub result: Result<DispatchOutcome, LedgerError>,
}

/// Use case for dispatching matched pairs.
pub struct DispatchPairUseCase<L, P, G, A, E>
where
    L: LedgerRepository,
    P: MatchedPairRepository,
    G: ExecutionGatewayPort,
    A: AccountDirectoryPort,
    E: EventPublisherPort,
{
    ledger: Arc<L>,
    pairs: Arc<P>,
    gateway: Arc<G>,
    accounts: Arc<A>,
    event_publisher: Arc<E>,
}

impl<L, P, G, A, E> DispatchPairUseCase<L, P, G, A, E>
where
    L: LedgerRepository,
    P: MatchedPairRepository,
    G: ExecutionGatewayPort,
    A: AccountDirectoryPort,
    E: EventPublisherPort,
{
    /// Create a new `DispatchPairUseCase`.
    pub const fn new(
        ledger: Arc<L>,
        pairs: Arc<P>,
        gateway: Arc<G>,
        accounts: Arc<A>,
        event_publisher: Arc<E>,
    ) -> Self {
        Self {
            ledger,
            pairs,
            gateway,
            accounts,
            event_publisher,
        }
    }

    /// Send a pair's buy leg to the venue.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown pair, transaction or fund,
    /// `INVALID_STATE_TRANSITION` if the buy leg is no longer pending,
    /// `ACCOUNT_NOT_MAPPED` if the buyer has no venue account, and
    /// `GATEWAY_UNAVAILABLE` if the venue call failed or timed out. The pair
    /// stays unsent in every case; all but `GATEWAY_UNAVAILABLE` also park it.
    pub async fn dispatch_pair(&self, pair_id: &PairId) -> Result<DispatchOutcome, LedgerError> {
        let result = self.dispatch(pair_id).await;
        match &result {
            Ok(outcome) => record_dispatch_outcome(outcome.as_str()),
            Err(e) => {
                record_dispatch_outcome("error");
                tracing::warn!(
                    pair_id = %pair_id,
                    code = %e.code(),
                    "Dispatch failed: {}",
                    e.message()
                );
            }
        }
        if let Some(reason) = park_reason(&result) {
            self.park(pair_id, &reason).await;
        }
        result
    }

    /// Dispatch up to `limit` unsent, unparked pairs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error only if the unsent pairs cannot be listed; per-pair
    /// failures are reported in each [`DispatchReport`].
    pub async fn dispatch_pending(&self, limit: usize) -> Result<Vec<DispatchReport>, LedgerError> {
        let unsent = self.pairs.find_unsent(limit).await?;
        let ids: Vec<PairId> = unsent.iter().map(|p| p.id().clone()).collect();
        Ok(self.dispatch_pairs(&ids).await)
    }

    /// Dispatch a cycle's new pairs first, then fill the rest of `limit`
    /// with older unsent pairs.
    ///
    /// New pairs beyond `limit` stay queued for the next call.
    ///
    /// # Errors
    ///
    /// Returns error only if the unsent pairs cannot be listed.
    pub async fn dispatch_new_then_backlog(
        &self,
        new_pairs: &[PairId],
        limit: usize,
    ) -> Result<Vec<DispatchReport>, LedgerError> {
        let fresh = &new_pairs[..new_pairs.len().min(limit)];
        let mut reports = self.dispatch_pairs(fresh).await;

        let room = limit - fresh.len();
        if room == 0 {
            return Ok(reports);
        }
        let backlog: Vec<PairId> = self
            .pairs
            .find_unsent(room + new_pairs.len())
            .await?
            .into_iter()
            .map(|p| p.id().clone())
            .filter(|id| !new_pairs.contains(id))
            .take(room)
            .collect();
        reports.extend(self.dispatch_pairs(&backlog).await);
        Ok(reports)
    }

    /// Dispatch the given pairs one after another.
    pub async fn dispatch_pairs(&self, pair_ids: &[PairId]) -> Vec<DispatchReport> {
        let mut reports = Vec::with_capacity(pair_ids.len());
        for pair_id in pair_ids {
            reports.push(DispatchReport {
                pair_id: pair_id.clone(),
                result: self.dispatch_pair(pair_id).await,
            });
        }
        reports
    }

    async fn park(&self, pair_id: &PairId, reason: &str) {
        match self.pairs.park(pair_id, reason).await {
            Ok(true) => tracing::info!(pair_id = %pair_id, reason, "Pair parked"),
            Ok(false) | Err(RepositoryError::NotFound { .. }) => {}
            Err(e) => tracing::error!(pair_id = %pair_id, "Failed to park pair: {}", e),
        }
    }

    async fn dispatch(&self, pair_id: &PairId) -> Result<DispatchOutcome, LedgerError> {
        // 1. Load the pair; a sent pair is a no-op
        let pair = self
            .pairs
            .find_pair(pair_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("matched_pair", pair_id.as_str()))?;
        if pair.is_sent() {
            return Ok(DispatchOutcome::AlreadySent);
        }

        // 2. The buy leg must still be pending
        let buy = self
            .ledger
            .find_transaction(pair.buy_transaction())
            .await?
            .ok_or_else(|| {
                LedgerError::not_found("transaction", pair.buy_transaction().as_str())
            })?
            .into_inner();
        if !buy.is_pending() {
            return Err(LedgerError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "buy transaction {} is {}; only pending orders are dispatched",
                    buy.id(),
                    buy.status()
                ),
            )
            .with_context("pair_id", pair_id.as_str())
            .with_context("transaction_id", buy.id().as_str()));
        }

        // 3. Resolve the venue symbol and account
        let fund = self
            .ledger
            .find_fund(pair.fund())
            .await?
            .ok_or_else(|| LedgerError::not_found("fund", pair.fund().as_str()))?
            .into_inner();
        let account = self
            .accounts
            .resolve_account(buy.investor())
            .await?
            .ok_or_else(|| LedgerError::account_not_mapped(buy.investor().as_str()))?;

        // 4. Call the venue (no lock held)
        let request = GatewayOrderRequest::market_buy(
            pair.id().clone(),
            account,
            fund.ticker().to_string(),
            pair.matched_quantity(),
        );
        let ack = self.gateway.submit_order(request).await.map_err(|e| {
            LedgerError::gateway_unavailable(e.to_string()).with_context("pair_id", pair_id.as_str())
        })?;

        let venue_order_id = match ack {
            GatewayAck::Accepted { venue_order_id } => venue_order_id,
            GatewayAck::Rejected { reason } => {
                tracing::warn!(pair_id = %pair_id, reason = %reason, "Venue rejected buy leg");
                return Ok(DispatchOutcome::Failed { reason });
            }
        };

        // 5. Record acceptance; losing a race to another dispatcher is a no-op
        let now = Timestamp::now();
        if !self
            .pairs
            .mark_sent(pair_id, venue_order_id.clone(), now)
            .await?
        {
            return Ok(DispatchOutcome::AlreadySent);
        }

        tracing::info!(
            pair_id = %pair_id,
            venue_order_id = %venue_order_id,
            quantity = %pair.matched_quantity(),
            "Buy leg accepted by venue"
        );

        // 6. Publish events
        let event = MatchingEvent::PairDispatched(PairDispatched {
            pair_id: pair_id.clone(),
            venue_order_id: venue_order_id.clone(),
            occurred_at: now,
        });
        if let Err(e) = self.event_publisher.publish_matching_events(vec![event]).await {
            tracing::error!("Failed to publish dispatch events: {}", e);
        }

        Ok(DispatchOutcome::Sent { venue_order_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{GatewayError, MockExecutionGatewayPort, NoOpEventPublisher};
    use crate::domain::fund::{Fund, NewFund};
    use crate::domain::matching::{MatchedOrderPair, QuantityLimit};
    use crate::domain::pricing::FeeSchedule;
    use crate::domain::shared::{FundId, InvestorId, Money, TransactionId, Units};
    use crate::domain::transaction::{SubmitTransactionCommand, Transaction, TransactionType};
    use crate::infrastructure::accounts::StaticAccountDirectory;
    use crate::infrastructure::persistence::{
        InMemoryLedgerRepository, InMemoryMatchedPairRepository,
    };
    use rust_decimal_macros::dec;

    type UseCase = DispatchPairUseCase<
        InMemoryLedgerRepository,
        InMemoryMatchedPairRepository,
        MockExecutionGatewayPort,
        StaticAccountDirectory,
        NoOpEventPublisher,
    >;

    struct Fixture {
        ledger: Arc<InMemoryLedgerRepository>,
        pairs: Arc<InMemoryMatchedPairRepository>,
        pair_id: PairId,
        buy_id: TransactionId,
    }

    async fn fixture() -> Fixture {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        let fund = Fund::new(NewFund {
            id: FundId::new("fund-a"),
            ticker: "FNDA".to_string(),
            currency: "IDR".to_string(),
            current_nav: Money::new(dec!(1000)),
            previous_nav: None,
        })
        .unwrap();
        ledger.upsert_fund(&fund).await.unwrap();

        let mut ids = Vec::new();
        for (investor, kind) in [("inv-1", TransactionType::Purchase), ("inv-2", TransactionType::Sell)] {
            let tx = Transaction::submit(
                SubmitTransactionCommand {
                    investor: InvestorId::new(investor),
                    fund: FundId::new("fund-a"),
                    transaction_type: kind,
                    units: Units::new(dec!(10)),
                    price_per_unit: Money::new(dec!(1000)),
                    destination: None,
                    document_reference: None,
                },
                &FeeSchedule::default(),
            )
            .unwrap();
            ledger.insert_transaction(&tx).await.unwrap();
            ids.push(tx.id().clone());
        }

        let pairs = Arc::new(InMemoryMatchedPairRepository::new());
        let pair = MatchedOrderPair::new(
            FundId::new("fund-a"),
            ids[0].clone(),
            ids[1].clone(),
            Units::new(dec!(10)),
            Timestamp::now(),
        )
        .unwrap();
        let limits = [QuantityLimit {
            transaction_id: ids[0].clone(),
            units: Units::new(dec!(10)),
        }];
        pairs.insert_pairs(std::slice::from_ref(&pair), &limits).await.unwrap();

        Fixture {
            ledger,
            pairs,
            pair_id: pair.id().clone(),
            buy_id: ids[0].clone(),
        }
    }

    fn use_case(f: &Fixture, gateway: MockExecutionGatewayPort, mapped: bool) -> UseCase {
        let accounts = if mapped {
            StaticAccountDirectory::from_pairs([("inv-1", "acct-1")])
        } else {
            StaticAccountDirectory::new()
        };
        DispatchPairUseCase::new(
            Arc::clone(&f.ledger),
            Arc::clone(&f.pairs),
            Arc::new(gateway),
            Arc::new(accounts),
            Arc::new(NoOpEventPublisher),
        )
    }

    fn accepting_gateway(times: usize) -> MockExecutionGatewayPort {
        let mut gateway = MockExecutionGatewayPort::new();
        gateway
            .expect_submit_order()
            .withf(|req| {
                req.account.as_str() == "acct-1"
                    && req.fund_symbol == "FNDA"
                    && req.is_market()
                    && req.quantity.amount() == dec!(10)
            })
            .times(times)
            .returning(|_| {
                Ok(GatewayAck::Accepted {
                    venue_order_id: VenueOrderId::new("venue-1"),
                })
            });
        gateway
    }

    #[tokio::test]
    async fn accepted_pair_is_marked_sent() {
        let f = fixture().await;
        let dispatch = use_case(&f, accepting_gateway(1), true);

        let outcome = dispatch.dispatch_pair(&f.pair_id).await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Sent {
                venue_order_id: VenueOrderId::new("venue-1")
            }
        );
        let pair = f.pairs.find_pair(&f.pair_id).await.unwrap().unwrap();
        assert!(pair.is_sent());
        assert!(pair.sent_to_exchange_at().is_some());
    }

    #[tokio::test]
    async fn sent_pair_is_not_dispatched_again() {
        let f = fixture().await;
        let dispatch = use_case(&f, accepting_gateway(1), true);
        dispatch.dispatch_pair(&f.pair_id).await.unwrap();

        let outcome = dispatch.dispatch_pair(&f.pair_id).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::AlreadySent);
    }

    #[tokio::test]
    async fn rejection_leaves_pair_unsent() {
        let f = fixture().await;
        let mut gateway = MockExecutionGatewayPort::new();
        gateway.expect_submit_order().times(1).returning(|_| {
            Ok(GatewayAck::Rejected {
                reason: "market closed".to_string(),
            })
        });
        let dispatch = use_case(&f, gateway, true);

        let outcome = dispatch.dispatch_pair(&f.pair_id).await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                reason: "market closed".to_string()
            }
        );
        assert!(!f.pairs.find_pair(&f.pair_id).await.unwrap().unwrap().is_sent());
        assert_eq!(
            f.pairs.parked_reason(&f.pair_id).as_deref(),
            Some("venue rejected: market closed")
        );
        assert!(dispatch.dispatch_pending(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn gateway_timeout_is_unavailable_and_retry_is_safe() {
        let f = fixture().await;
        let mut gateway = MockExecutionGatewayPort::new();
        let mut calls = 0;
        gateway.expect_submit_order().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(GatewayError::Timeout { timeout_ms: 5000 })
            } else {
                Ok(GatewayAck::Accepted {
                    venue_order_id: VenueOrderId::new("venue-2"),
                })
            }
        });
        let dispatch = use_case(&f, gateway, true);

        let err = dispatch.dispatch_pair(&f.pair_id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::GatewayUnavailable);
        assert!(!f.pairs.find_pair(&f.pair_id).await.unwrap().unwrap().is_sent());
        assert!(f.pairs.parked_reason(&f.pair_id).is_none());

        let outcome = dispatch.dispatch_pair(&f.pair_id).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::Sent { .. }));
    }

    #[tokio::test]
    async fn missing_account_is_a_hard_failure() {
        let f = fixture().await;
        let mut gateway = MockExecutionGatewayPort::new();
        gateway.expect_submit_order().never();
        let dispatch = use_case(&f, gateway, false);

        let err = dispatch.dispatch_pair(&f.pair_id).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::AccountNotMapped);
        assert_eq!(err.context_value("investor"), Some("inv-1"));
        assert!(f.pairs.parked_reason(&f.pair_id).is_some());
        assert!(f.pairs.find_unsent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn settled_buy_leg_is_not_dispatched() {
        let f = fixture().await;
        let mut buy = f.ledger.find_transaction(&f.buy_id).await.unwrap().unwrap();
        let mut working = crate::domain::position::PositionLedger::new();
        working.load_fund(f.ledger.find_fund(&FundId::new("fund-a")).await.unwrap().unwrap().value);
        buy.value.cancel(&mut working).unwrap();
        f.ledger
            .commit(crate::domain::transaction::LedgerChangeSet {
                transaction: crate::domain::transaction::VersionedWrite::new(
                    buy.value,
                    Some(buy.version),
                ),
                positions: vec![],
                funds: vec![],
            })
            .await
            .unwrap();
        let mut gateway = MockExecutionGatewayPort::new();
        gateway.expect_submit_order().never();
        let dispatch = use_case(&f, gateway, true);

        let err = dispatch.dispatch_pair(&f.pair_id).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[tokio::test]
    async fn unknown_pair_is_not_found() {
        let f = fixture().await;
        let dispatch = use_case(&f, MockExecutionGatewayPort::new(), true);

        let err = dispatch.dispatch_pair(&PairId::new("nope")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn dispatch_pending_reports_each_pair() {
        let f = fixture().await;
        let dispatch = use_case(&f, accepting_gateway(1), true);

        let reports = dispatch.dispatch_pending(10).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].pair_id, f.pair_id);
        assert!(matches!(reports[0].result, Ok(DispatchOutcome::Sent { .. })));

        assert!(dispatch.dispatch_pending(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn parked_pair_can_still_be_sent_explicitly() {
        let f = fixture().await;
        f.pairs.park(&f.pair_id, "account not mapped").await.unwrap();
        let dispatch = use_case(&f, accepting_gateway(1), true);

        assert!(dispatch.dispatch_pending(10).await.unwrap().is_empty());
        let outcome = dispatch.dispatch_pair(&f.pair_id).await.unwrap();

        assert!(matches!(outcome, DispatchOutcome::Sent { .. }));
        assert!(f.pairs.parked_reason(&f.pair_id).is_none());
    }

    #[tokio::test]
    async fn new_pairs_go_before_the_backlog() {
        let f = fixture().await;
        let newer = MatchedOrderPair::new(
            FundId::new("fund-a"),
            f.buy_id.clone(),
            TransactionId::new("late-sell"),
            Units::new(dec!(10)),
            Timestamp::now(),
        )
        .unwrap();
        f.pairs
            .insert_pairs(std::slice::from_ref(&newer), &[])
            .await
            .unwrap();
        let newer_id = newer.id().clone();
        let mut gateway = MockExecutionGatewayPort::new();
        gateway
            .expect_submit_order()
            .withf(move |req| req.client_reference == newer_id)
            .times(1)
            .returning(|_| {
                Ok(GatewayAck::Accepted {
                    venue_order_id: VenueOrderId::new("venue-3"),
                })
            });
        let dispatch = use_case(&f, gateway, true);

        let reports = dispatch
            .dispatch_new_then_backlog(&[newer.id().clone()], 1)
            .await
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(&reports[0].pair_id, newer.id());
        assert!(!f.pairs.find_pair(&f.pair_id).await.unwrap().unwrap().is_sent());
    }
}
