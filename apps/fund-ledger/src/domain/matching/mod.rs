//! Matching Bounded Context
//!
//! Pairs pending purchases against pending sells of the same fund.
//!
//! # Key Concepts
//!
//! - **Matched pair**: A proposal pairing one buy and one sell with a matched
//!   quantity; immutable except for the one-way sent flag
//! - **FIFO matching**: Oldest buy against oldest sell, ties broken by
//!   transaction ID ascending
//! - **Quantity conservation**: The matched quantity across all pairs that
//!   reference a transaction never exceeds its units

pub mod errors;
pub mod events;
pub mod matched_pair;
pub mod matcher;
pub mod repository;

pub use errors::MatchingError;
pub use events::{MatchingEvent, PairDispatched, PairMatched};
pub use matched_pair::MatchedOrderPair;
pub use matcher::{MatchCandidate, OrderMatcher};
pub use repository::{MatchedPairRepository, QuantityLimit};
