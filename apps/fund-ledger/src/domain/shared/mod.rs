//! Shared Domain Types
//!
//! Value objects, errors and persistence primitives shared across bounded
//! contexts.

pub mod errors;
pub mod repository;
pub mod value_objects;

pub use errors::DomainError;
pub use repository::{RepositoryError, Versioned};
pub use value_objects::{
    AccountId, FundId, InvestorId, Money, PairId, Timestamp, TransactionId, Units, VenueOrderId,
};
