//! Persistence Adapters
//!
//! Storage implementations of the ledger and matched-pair repository traits.

pub mod in_memory;

pub use in_memory::{InMemoryLedgerRepository, InMemoryMatchedPairRepository};
