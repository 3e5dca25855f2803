//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod dispatch_pair;
mod match_orders;
mod query_position;
mod quote_price;
mod settle_transaction;
mod submit_transaction;

pub use dispatch_pair::{DispatchOutcome, DispatchPairUseCase, DispatchReport};
pub use match_orders::MatchOrdersUseCase;
pub use query_position::QueryLedgerUseCase;
pub use quote_price::QuotePriceUseCase;
pub use settle_transaction::{Settlement, SettleTransactionUseCase};
pub use submit_transaction::SubmitTransactionUseCase;
