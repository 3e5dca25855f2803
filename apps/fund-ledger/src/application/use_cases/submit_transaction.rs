//! Submit Transaction Use Case

use std::sync::Arc;

use crate::application::ports::EventPublisherPort;
use crate::domain::pricing::FeeSchedule;
use crate::domain::transaction::{LedgerRepository, SubmitTransactionCommand, Transaction};
use crate::error::LedgerError;
use crate::observability::record_submission;

/// Use case for recording a new pending transaction.
pub struct SubmitTransactionUseCase<L, E>
where
    L: LedgerRepository,
    E: EventPublisherPort,
{
    ledger: Arc<L>,
    event_publisher: Arc<E>,
    fees: FeeSchedule,
}

impl<L, E> SubmitTransactionUseCase<L, E>
where
    L: LedgerRepository,
    E: EventPublisherPort,
{
    /// Create a new `SubmitTransactionUseCase`.
    pub const fn new(ledger: Arc<L>, event_publisher: Arc<E>, fees: FeeSchedule) -> Self {
        Self {
            ledger,
            event_publisher,
            fees,
        }
    }

    /// Validate and persist a pending transaction.
    ///
    /// Amount and fee are fixed here. The source fund (and destination fund
    /// for an exchange) must be registered.
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` for bad input, `NOT_FOUND` for an unknown
    /// fund, or a storage error.
    pub async fn execute(&self, cmd: SubmitTransactionCommand) -> Result<Transaction, LedgerError> {
        let kind = cmd.transaction_type.to_string();

        let result = self.submit(cmd).await;
        record_submission(&kind, if result.is_ok() { "accepted" } else { "rejected" });
        result
    }

    async fn submit(&self, cmd: SubmitTransactionCommand) -> Result<Transaction, LedgerError> {
        // 1. Build the aggregate (validates input, computes amount and fee)
        let mut transaction = Transaction::submit(cmd, &self.fees)?;

        // 2. Every fund the transaction settles against must exist
        for fund in transaction.fund_ids() {
            if self.ledger.find_fund(&fund).await?.is_none() {
                return Err(LedgerError::not_found("fund", fund.as_str()));
            }
        }

        // 3. Persist
        self.ledger.insert_transaction(&transaction).await?;

        tracing::info!(
            transaction_id = %transaction.id(),
            investor = %transaction.investor(),
            fund = %transaction.fund(),
            transaction_type = %transaction.transaction_type(),
            units = %transaction.units(),
            amount = %transaction.amount(),
            fee = %transaction.fee(),
            "Transaction submitted"
        );

        // 4. Publish events
        let events = transaction.drain_events();
        if let Err(e) = self.event_publisher.publish_transaction_events(events).await {
            tracing::error!("Failed to publish submit events: {}", e);
        }

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NoOpEventPublisher;
    use crate::domain::fund::{Fund, NewFund};
    use crate::domain::shared::{FundId, InvestorId, Money, Units};
    use crate::domain::transaction::{ExchangeDestination, TransactionStatus, TransactionType};
    use crate::error::ErrorCode;
    use crate::infrastructure::persistence::InMemoryLedgerRepository;
    use rust_decimal_macros::dec;

    async fn setup() -> (
        Arc<InMemoryLedgerRepository>,
        SubmitTransactionUseCase<InMemoryLedgerRepository, NoOpEventPublisher>,
    ) {
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
        let use_case = SubmitTransactionUseCase::new(
            Arc::clone(&ledger),
            Arc::new(NoOpEventPublisher),
            FeeSchedule::default(),
        );
        (ledger, use_case)
    }

    fn purchase(fund: &str) -> SubmitTransactionCommand {
        SubmitTransactionCommand {
            investor: InvestorId::new("inv-1"),
            fund: FundId::new(fund),
            transaction_type: TransactionType::Purchase,
            units: Units::new(dec!(10)),
            price_per_unit: Money::new(dec!(1000.005)),
            destination: None,
            document_reference: Some("docs/inv-1/subscription.pdf".to_string()),
        }
    }

    #[tokio::test]
    async fn submit_persists_pending_transaction() {
        let (ledger, use_case) = setup().await;

        let tx = use_case.execute(purchase("fund-a")).await.unwrap();

        assert_eq!(tx.status(), TransactionStatus::Pending);
        assert_eq!(tx.amount().amount(), dec!(10000.05));
        assert_eq!(tx.fee().amount(), dec!(30.00));
        assert!(tx.pending_events().is_empty());
        let stored = ledger.find_transaction(tx.id()).await.unwrap().unwrap();
        assert_eq!(stored.value.document_reference(), Some("docs/inv-1/subscription.pdf"));
    }

    #[tokio::test]
    async fn unknown_fund_is_not_found() {
        let (ledger, use_case) = setup().await;

        let err = use_case.execute(purchase("fund-z")).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(ledger.transaction_count(), 0);
    }

    #[tokio::test]
    async fn unknown_destination_fund_is_not_found() {
        let (_, use_case) = setup().await;
        let mut cmd = purchase("fund-a");
        cmd.transaction_type = TransactionType::Exchange;
        cmd.destination = Some(ExchangeDestination {
            fund: FundId::new("fund-z"),
            units: Units::new(dec!(5)),
            price_per_unit: Money::new(dec!(2000)),
        });

        let err = use_case.execute(cmd).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn invalid_units_are_a_validation_error() {
        let (ledger, use_case) = setup().await;
        let mut cmd = purchase("fund-a");
        cmd.units = Units::ZERO;

        let err = use_case.execute(cmd).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(ledger.transaction_count(), 0);
    }
}
