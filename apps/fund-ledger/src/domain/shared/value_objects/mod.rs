//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.
//! Value objects are compared by value, not identity.

mod identifiers;
mod money;
mod timestamp;
mod units;

pub use identifiers::{AccountId, FundId, InvestorId, PairId, TransactionId, VenueOrderId};
pub use money::Money;
pub use timestamp::Timestamp;
pub use units::Units;
