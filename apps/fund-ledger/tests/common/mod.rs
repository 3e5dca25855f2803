//! Shared wiring for the integration tests.
//!
//! Everything runs in-process: in-memory stores, the paper venue behind the
//! timeout/retry wrapper, a static account directory and NAV table.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use fund_ledger::application::ports::NoOpEventPublisher;
use fund_ledger::domain::fund::{Fund, NewFund};
use fund_ledger::domain::transaction::LedgerRepository;
use fund_ledger::infrastructure::accounts::StaticAccountDirectory;
use fund_ledger::infrastructure::config::{Container, LedgerSettings};
use fund_ledger::infrastructure::gateway::{PaperExecutionGateway, ResilientGateway, RetryPolicy};
use fund_ledger::infrastructure::market_data::StaticNavProvider;
use fund_ledger::infrastructure::persistence::{
    InMemoryLedgerRepository, InMemoryMatchedPairRepository,
};
use fund_ledger::{
    ExchangeDestination, FundId, InvestorId, Money, SubmitTransactionCommand, Transaction,
    TransactionType, Units,
};
use rust_decimal::Decimal;

pub const EQUITY: &str = "fund-equity";
pub const BOND: &str = "fund-bond";
pub const INVESTOR: &str = "investor-1";
pub const ACCOUNT: &str = "acct-1";

pub type TestContainer = Container<
    InMemoryLedgerRepository,
    InMemoryMatchedPairRepository,
    ResilientGateway<PaperExecutionGateway>,
    StaticAccountDirectory,
    StaticNavProvider,
    NoOpEventPublisher,
>;

/// Retry quickly so transient-failure tests stay fast.
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        backoff_multiplier: 2.0,
        jitter_factor: 0.0,
    }
}

/// Container with two funds and one mapped investor.
pub async fn container_with_retry(policy: RetryPolicy) -> TestContainer {
    let ledger = Arc::new(InMemoryLedgerRepository::new());
    let mut funds = Vec::new();
    for (id, ticker, nav) in [(EQUITY, "EQTY", 1000), (BOND, "BOND", 250)] {
        let fund = Fund::new(NewFund {
            id: FundId::new(id),
            ticker: ticker.to_string(),
            currency: "IDR".to_string(),
            current_nav: Money::new(Decimal::from(nav)),
            previous_nav: None,
        })
        .unwrap();
        ledger.upsert_fund(&fund).await.unwrap();
        funds.push(fund);
    }

    let gateway = ResilientGateway::new(
        PaperExecutionGateway::new(),
        "paper",
        Duration::from_millis(500),
        policy,
    );

    Container::new(
        ledger,
        Arc::new(InMemoryMatchedPairRepository::new()),
        Arc::new(gateway),
        Arc::new(StaticAccountDirectory::from_pairs([(INVESTOR, ACCOUNT)])),
        Arc::new(StaticNavProvider::from_funds(&funds)),
        Arc::new(NoOpEventPublisher),
        LedgerSettings::default(),
    )
}

pub async fn container() -> TestContainer {
    container_with_retry(fast_retry(3)).await
}

pub fn order(
    investor: &str,
    fund: &str,
    transaction_type: TransactionType,
    units: Decimal,
    price: Decimal,
) -> SubmitTransactionCommand {
    SubmitTransactionCommand {
        investor: InvestorId::new(investor),
        fund: FundId::new(fund),
        transaction_type,
        units: Units::new(units),
        price_per_unit: Money::new(price),
        destination: None,
        document_reference: None,
    }
}

pub fn exchange(
    investor: &str,
    units: Decimal,
    price: Decimal,
    destination_units: Decimal,
    destination_price: Decimal,
) -> SubmitTransactionCommand {
    SubmitTransactionCommand {
        destination: Some(ExchangeDestination {
            fund: FundId::new(BOND),
            units: Units::new(destination_units),
            price_per_unit: Money::new(destination_price),
        }),
        ..order(investor, EQUITY, TransactionType::Exchange, units, price)
    }
}

/// Submit and complete a purchase.
pub async fn settled_purchase(
    container: &TestContainer,
    fund: &str,
    units: Decimal,
    price: Decimal,
) -> Transaction {
    let tx = container
        .submit_transaction_use_case()
        .execute(order(INVESTOR, fund, TransactionType::Purchase, units, price))
        .await
        .unwrap();
    container
        .settle_transaction_use_case()
        .complete_transaction(tx.id())
        .await
        .unwrap()
        .transaction
}
