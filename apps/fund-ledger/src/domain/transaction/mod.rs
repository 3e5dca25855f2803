//! Transaction Bounded Context
//!
//! Owns the transaction lifecycle and drives the position ledger.
//!
//! # Key Concepts
//!
//! - **Transaction Aggregate**: Purchase, sell or exchange, with amount and
//!   fee fixed at submission
//! - **State**: A closed tagged enum (`Pending`, `Completed`, `Cancelled`)
//!   carrying the recorded ledger effect
//! - **Ledger Repository**: Atomic, version-checked commit of a transaction
//!   and every row its settlement touched

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{ReconstitutedTransactionParams, SubmitTransactionCommand, Transaction};
pub use errors::TransactionError;
pub use events::{
    TransactionCancelled, TransactionCompleted, TransactionEvent, TransactionSubmitted,
};
pub use repository::{LedgerChangeSet, LedgerRepository, VersionedWrite};
pub use services::TransactionStateMachine;
pub use value_objects::{ExchangeDestination, TransactionState, TransactionStatus, TransactionType};
