//! Settle Transaction Use Case
//!
//! Completion and cancellation run as one unit of work: load the
//! transaction and every row it touches with their versions, apply the
//! transition to an in-memory [`PositionLedger`], then commit everything in
//! one version-checked write. A lost race is retried from a fresh read.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::application::ports::EventPublisherPort;
use crate::domain::position::{Position, PositionKey, PositionLedger};
use crate::domain::shared::{FundId, TransactionId};
use crate::domain::transaction::{
    LedgerChangeSet, LedgerRepository, Transaction, VersionedWrite,
};
use crate::error::{ErrorCode, LedgerError};
use crate::observability::{record_concurrency_retry, record_settlement};

/// Result of a completed or cancelled transaction.
#[derive(Debug, Clone)]
pub struct Settlement {
    /// Transaction in its new state.
    pub transaction: Transaction,
    /// Source-fund position after the transition.
    pub position: Position,
    /// Destination-fund position, for exchanges.
    pub destination_position: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettleAction {
    Complete,
    Cancel,
}

impl SettleAction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

/// Use case for completing and cancelling transactions.
pub struct SettleTransactionUseCase<L, E>
where
    L: LedgerRepository,
    E: EventPublisherPort,
{
    ledger: Arc<L>,
    event_publisher: Arc<E>,
    max_conflict_retries: u32,
}

impl<L, E> SettleTransactionUseCase<L, E>
where
    L: LedgerRepository,
    E: EventPublisherPort,
{
    /// Create a new `SettleTransactionUseCase`.
    pub const fn new(ledger: Arc<L>, event_publisher: Arc<E>, max_conflict_retries: u32) -> Self {
        Self {
            ledger,
            event_publisher,
            max_conflict_retries,
        }
    }

    /// Complete a pending transaction, applying its ledger effect.
    ///
    /// # Errors
    ///
    /// `INVALID_STATE_TRANSITION` unless pending, `INSUFFICIENT_UNITS` if the
    /// holding cannot cover a sell or exchange, `NOT_FOUND`, or
    /// `CONCURRENCY_CONFLICT` once retries are exhausted.
    pub async fn complete_transaction(&self, id: &TransactionId) -> Result<Settlement, LedgerError> {
        self.settle(id, SettleAction::Complete).await
    }

    /// Cancel a transaction, reversing its recorded effect if it completed.
    ///
    /// # Errors
    ///
    /// `INVALID_STATE_TRANSITION` if already cancelled, `INSUFFICIENT_UNITS`
    /// if the reversal would drive a position negative, `NOT_FOUND`, or
    /// `CONCURRENCY_CONFLICT` once retries are exhausted.
    pub async fn cancel_transaction(&self, id: &TransactionId) -> Result<Settlement, LedgerError> {
        self.settle(id, SettleAction::Cancel).await
    }

    async fn settle(
        &self,
        id: &TransactionId,
        action: SettleAction,
    ) -> Result<Settlement, LedgerError> {
        let started = Instant::now();
        let result = self.settle_with_retry(id, action).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.code().reason(),
        };
        record_settlement(action.as_str(), outcome, started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            tracing::warn!(
                transaction_id = %id,
                action = action.as_str(),
                code = %e.code(),
                "Settlement rejected: {}",
                e.message()
            );
        }
        result
    }

    async fn settle_with_retry(
        &self,
        id: &TransactionId,
        action: SettleAction,
    ) -> Result<Settlement, LedgerError> {
        let attempts = self.max_conflict_retries.saturating_add(1);

        for attempt in 1..=attempts {
            match self.try_settle(id, action).await {
                Err(e) if e.code() == ErrorCode::ConcurrencyConflict => {
                    record_concurrency_retry(action.as_str());
                    tracing::debug!(
                        transaction_id = %id,
                        action = action.as_str(),
                        attempt,
                        "Version conflict, retrying unit of work: {}",
                        e.message()
                    );
                }
                other => return other,
            }
        }

        Err(LedgerError::concurrency_conflict(attempts).with_context("transaction_id", id.as_str()))
    }

    async fn try_settle(
        &self,
        id: &TransactionId,
        action: SettleAction,
    ) -> Result<Settlement, LedgerError> {
        // 1. Load the transaction
        let versioned = self
            .ledger
            .find_transaction(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("transaction", id.as_str()))?;
        let (mut transaction, transaction_version) = (versioned.value, versioned.version);

        // 2. Load every fund and position the transition may touch
        let mut working = PositionLedger::new();
        let mut fund_versions: HashMap<FundId, u64> = HashMap::new();
        for fund_id in transaction.fund_ids() {
            if let Some(row) = self.ledger.find_fund(&fund_id).await? {
                fund_versions.insert(fund_id, row.version);
                working.load_fund(row.value);
            }
        }
        let mut position_versions: HashMap<PositionKey, u64> = HashMap::new();
        for key in transaction.position_keys() {
            if let Some(row) = self.ledger.find_position(&key).await? {
                position_versions.insert(key, row.version);
                working.load_position(row.value);
            }
        }

        // 3. Apply the transition in memory
        match action {
            SettleAction::Complete => transaction.complete(&mut working)?,
            SettleAction::Cancel => transaction.cancel(&mut working)?,
        }
        let events = transaction.drain_events();

        // 4. Commit everything that changed in one version-checked write
        let changes = LedgerChangeSet {
            transaction: VersionedWrite::new(transaction.clone(), Some(transaction_version)),
            positions: working
                .changed_positions()
                .into_iter()
                .map(|p| {
                    let version = position_versions.get(p.key()).copied();
                    VersionedWrite::new(p, version)
                })
                .collect(),
            funds: working
                .changed_funds()
                .into_iter()
                .map(|f| {
                    let version = fund_versions.get(f.id()).copied();
                    VersionedWrite::new(f, version)
                })
                .collect(),
        };
        self.ledger.commit(changes).await?;

        tracing::info!(
            transaction_id = %transaction.id(),
            investor = %transaction.investor(),
            fund = %transaction.fund(),
            status = %transaction.status(),
            "Transaction settled"
        );

        // 5. Publish events (after commit; failures never undo the write)
        if let Err(e) = self.event_publisher.publish_transaction_events(events).await {
            tracing::error!("Failed to publish settlement events: {}", e);
        }

        let position = working.position(&PositionKey::new(
            transaction.investor().clone(),
            transaction.fund().clone(),
        ));
        let destination_position = transaction.destination().map(|dest| {
            working.position(&PositionKey::new(
                transaction.investor().clone(),
                dest.fund.clone(),
            ))
        });

        Ok(Settlement {
            transaction,
            position,
            destination_position,
        })
    }
}
