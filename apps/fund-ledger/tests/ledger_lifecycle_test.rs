//! Ledger Lifecycle Integration Tests
//!
//! Drives transactions through submit, complete and cancel against the
//! wired container and checks positions, fund totals and error codes:
//! - Purchase settlement at weighted-average cost
//! - Partial sell at proportional cost
//! - Cancelling a completed purchase restores the prior position
//! - Exchange moves cost between funds atomically
//! - Illegal transitions and oversells leave the ledger untouched

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{BOND, EQUITY, INVESTOR, container, exchange, order, settled_purchase};
use fund_ledger::domain::transaction::LedgerRepository;
use fund_ledger::{
    ErrorCode, FundId, InvestorId, PositionKey, TransactionStatus, TransactionType, Units,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn key(fund: &str) -> PositionKey {
    PositionKey::new(InvestorId::new(INVESTOR), FundId::new(fund))
}

// ============================================
// Submission
// ============================================

#[tokio::test]
async fn submit_records_pending_with_amount_and_fee() {
    let container = container().await;

    let tx = container
        .submit_transaction_use_case()
        .execute(order(
            INVESTOR,
            EQUITY,
            TransactionType::Purchase,
            dec!(10),
            dec!(1000.005),
        ))
        .await
        .unwrap();

    assert_eq!(tx.status(), TransactionStatus::Pending);
    // 10 × 1000.005 = 10000.05
    assert_eq!(tx.amount().amount(), dec!(10000.05));
    // 10000.05 × 0.3% = 30.00015 -> 30.00
    assert_eq!(tx.fee().amount(), dec!(30.00));

    let stored = container
        .query_use_case()
        .get_transaction(tx.id())
        .await
        .unwrap();
    assert_eq!(stored.id(), tx.id());
    assert!(stored.is_pending());
}

#[tokio::test]
async fn submit_to_unknown_fund_is_not_found() {
    let container = container().await;

    let err = container
        .submit_transaction_use_case()
        .execute(order(
            INVESTOR,
            "fund-missing",
            TransactionType::Purchase,
            dec!(1),
            dec!(100),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(container.ledger().transaction_count(), 0);
}

#[tokio::test]
async fn submit_with_zero_units_is_rejected() {
    let container = container().await;

    let err = container
        .submit_transaction_use_case()
        .execute(order(INVESTOR, EQUITY, TransactionType::Purchase, dec!(0), dec!(100)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::ValidationError);
}

#[tokio::test]
async fn submit_with_overflowing_amount_is_rejected() {
    let container = container().await;
    let huge = Decimal::from(1_000_000_000_000_000_000_i64);

    let err = container
        .submit_transaction_use_case()
        .execute(order(INVESTOR, EQUITY, TransactionType::Purchase, huge, huge))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::ValidationError);
    assert_eq!(err.context_value("field"), Some("amount"));
}

// ============================================
// Purchase and sell
// ============================================

#[tokio::test]
async fn purchases_accumulate_at_weighted_average_cost() {
    let container = container().await;

    settled_purchase(&container, EQUITY, dec!(10), dec!(1000)).await;
    settled_purchase(&container, EQUITY, dec!(10), dec!(1100)).await;

    let position = container
        .query_use_case()
        .get_position(&key(EQUITY))
        .await
        .unwrap();
    assert_eq!(position.units().amount(), dec!(20));
    assert_eq!(position.amount().amount(), dec!(21000));
    assert_eq!(position.average_price().amount(), dec!(1050));

    let fund = container
        .ledger()
        .find_fund(&FundId::new(EQUITY))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fund.value.total_units().amount(), dec!(20));
}

#[tokio::test]
async fn partial_sell_removes_proportional_cost() {
    let container = container().await;
    settled_purchase(&container, EQUITY, dec!(10), dec!(1000)).await;

    let sell = container
        .submit_transaction_use_case()
        .execute(order(INVESTOR, EQUITY, TransactionType::Sell, dec!(4), dec!(1200)))
        .await
        .unwrap();
    let settlement = container
        .settle_transaction_use_case()
        .complete_transaction(sell.id())
        .await
        .unwrap();

    assert_eq!(settlement.transaction.status(), TransactionStatus::Completed);
    assert_eq!(settlement.position.units().amount(), dec!(6));
    assert_eq!(settlement.position.amount().amount(), dec!(6000));
    assert!(settlement.destination_position.is_none());
}

#[tokio::test]
async fn full_sell_leaves_a_closed_position() {
    let container = container().await;
    settled_purchase(&container, EQUITY, dec!(3), dec!(333.33)).await;

    let sell = container
        .submit_transaction_use_case()
        .execute(order(INVESTOR, EQUITY, TransactionType::Sell, dec!(3), dec!(400)))
        .await
        .unwrap();
    let settlement = container
        .settle_transaction_use_case()
        .complete_transaction(sell.id())
        .await
        .unwrap();

    assert!(settlement.position.is_closed());
    assert!(settlement.position.amount().is_zero());
    // Closed positions are kept, not deleted.
    assert_eq!(container.ledger().position_count(), 1);
}

#[tokio::test]
async fn oversell_fails_and_stays_pending() {
    let container = container().await;
    settled_purchase(&container, EQUITY, dec!(5), dec!(1000)).await;

    let sell = container
        .submit_transaction_use_case()
        .execute(order(INVESTOR, EQUITY, TransactionType::Sell, dec!(6), dec!(1000)))
        .await
        .unwrap();
    let err = container
        .settle_transaction_use_case()
        .complete_transaction(sell.id())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::InsufficientUnits);
    let query = container.query_use_case();
    assert!(query.get_transaction(sell.id()).await.unwrap().is_pending());
    assert_eq!(
        query.get_position(&key(EQUITY)).await.unwrap().units().amount(),
        dec!(5)
    );
}

// ============================================
// Cancellation
// ============================================

#[tokio::test]
async fn cancelling_pending_has_no_ledger_effect() {
    let container = container().await;

    let tx = container
        .submit_transaction_use_case()
        .execute(order(INVESTOR, EQUITY, TransactionType::Purchase, dec!(2), dec!(1000)))
        .await
        .unwrap();
    let settlement = container
        .settle_transaction_use_case()
        .cancel_transaction(tx.id())
        .await
        .unwrap();

    assert_eq!(settlement.transaction.status(), TransactionStatus::Cancelled);
    assert_eq!(settlement.position.units(), Units::ZERO);
}

#[tokio::test]
async fn cancelling_completed_purchase_restores_prior_position() {
    let container = container().await;
    settled_purchase(&container, EQUITY, dec!(10), dec!(1000)).await;
    let before = container
        .query_use_case()
        .get_position(&key(EQUITY))
        .await
        .unwrap();

    let second = settled_purchase(&container, EQUITY, dec!(7), dec!(1234.56)).await;
    let settlement = container
        .settle_transaction_use_case()
        .cancel_transaction(second.id())
        .await
        .unwrap();

    assert_eq!(settlement.transaction.status(), TransactionStatus::Cancelled);
    assert_eq!(settlement.position.units(), before.units());
    assert_eq!(settlement.position.amount(), before.amount());

    let fund = container
        .ledger()
        .find_fund(&FundId::new(EQUITY))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fund.value.total_units().amount(), dec!(10));
}

#[tokio::test]
async fn cancelling_purchase_after_units_were_sold_fails() {
    let container = container().await;
    let purchase = settled_purchase(&container, EQUITY, dec!(10), dec!(1000)).await;

    let sell = container
        .submit_transaction_use_case()
        .execute(order(INVESTOR, EQUITY, TransactionType::Sell, dec!(8), dec!(1000)))
        .await
        .unwrap();
    container
        .settle_transaction_use_case()
        .complete_transaction(sell.id())
        .await
        .unwrap();

    let err = container
        .settle_transaction_use_case()
        .cancel_transaction(purchase.id())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::InsufficientUnits);
    let stored = container
        .query_use_case()
        .get_transaction(purchase.id())
        .await
        .unwrap();
    assert_eq!(stored.status(), TransactionStatus::Completed);
}

#[tokio::test]
async fn terminal_states_reject_further_transitions() {
    let container = container().await;
    let settle = container.settle_transaction_use_case();
    let completed = settled_purchase(&container, EQUITY, dec!(1), dec!(1000)).await;

    let err = settle.complete_transaction(completed.id()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidStateTransition);

    settle.cancel_transaction(completed.id()).await.unwrap();
    let err = settle.cancel_transaction(completed.id()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    let err = settle.complete_transaction(completed.id()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
}

// ============================================
// Exchange
// ============================================

#[tokio::test]
async fn exchange_moves_units_between_funds() {
    let container = container().await;
    settled_purchase(&container, EQUITY, dec!(10), dec!(1000)).await;

    let tx = container
        .submit_transaction_use_case()
        .execute(exchange(INVESTOR, dec!(5), dec!(1000), dec!(20), dec!(250)))
        .await
        .unwrap();
    let settlement = container
        .settle_transaction_use_case()
        .complete_transaction(tx.id())
        .await
        .unwrap();

    assert_eq!(settlement.position.units().amount(), dec!(5));
    assert_eq!(settlement.position.amount().amount(), dec!(5000));
    let destination = settlement.destination_position.unwrap();
    assert_eq!(destination.fund(), &FundId::new(BOND));
    assert_eq!(destination.units().amount(), dec!(20));
    assert_eq!(destination.amount().amount(), dec!(5000));

    let positions = container
        .query_use_case()
        .positions_for_investor(&InvestorId::new(INVESTOR))
        .await
        .unwrap();
    assert_eq!(positions.len(), 2);
}

#[tokio::test]
async fn cancelling_exchange_reverses_both_legs() {
    let container = container().await;
    settled_purchase(&container, EQUITY, dec!(10), dec!(1000)).await;

    let settle = container.settle_transaction_use_case();
    let tx = container
        .submit_transaction_use_case()
        .execute(exchange(INVESTOR, dec!(4), dec!(1000), dec!(16), dec!(250)))
        .await
        .unwrap();
    settle.complete_transaction(tx.id()).await.unwrap();
    let settlement = settle.cancel_transaction(tx.id()).await.unwrap();

    assert_eq!(settlement.position.units().amount(), dec!(10));
    assert_eq!(settlement.position.amount().amount(), dec!(10000));
    let destination = settlement.destination_position.unwrap();
    assert!(destination.is_closed());
    assert!(destination.amount().is_zero());
}

#[tokio::test]
async fn exchange_without_source_units_applies_neither_leg() {
    let container = container().await;
    settled_purchase(&container, EQUITY, dec!(2), dec!(1000)).await;

    let tx = container
        .submit_transaction_use_case()
        .execute(exchange(INVESTOR, dec!(3), dec!(1000), dec!(12), dec!(250)))
        .await
        .unwrap();
    let err = container
        .settle_transaction_use_case()
        .complete_transaction(tx.id())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::InsufficientUnits);
    let query = container.query_use_case();
    assert_eq!(
        query.get_position(&key(EQUITY)).await.unwrap().units().amount(),
        dec!(2)
    );
    assert!(query.get_position(&key(BOND)).await.unwrap().is_closed());
}

// ============================================
// Queries
// ============================================

#[tokio::test]
async fn unknown_position_reads_as_zero() {
    let container = container().await;

    let position = container
        .query_use_case()
        .get_position(&PositionKey::new(
            InvestorId::new("someone-else"),
            FundId::new(BOND),
        ))
        .await
        .unwrap();

    assert!(position.is_closed());
    assert_eq!(position.average_price().amount(), dec!(0));
}

#[tokio::test]
async fn proposed_price_rounds_nav_to_step() {
    let container = container().await;

    // NAV 1000 is already on a 50 step; NAV 250 too.
    let quote = container.quote_price_use_case();
    assert_eq!(
        quote.propose_price(&FundId::new(EQUITY)).await.unwrap().amount(),
        dec!(1000)
    );
    assert_eq!(
        quote.propose_price(&FundId::new(BOND)).await.unwrap().amount(),
        dec!(250)
    );

    let err = quote
        .propose_price(&FundId::new("fund-missing"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}
