//! Ledger Repository Trait
//!
//! Persistence abstraction for transactions, positions and fund aggregates.
//! Every settlement is written through [`LedgerRepository::commit`], which
//! applies the whole change set atomically or not at all.

use async_trait::async_trait;

use super::aggregate::Transaction;
use crate::domain::fund::Fund;
use crate::domain::position::{Position, PositionKey};
use crate::domain::shared::{FundId, InvestorId, RepositoryError, TransactionId, Versioned};

/// A row to write together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedWrite<T> {
    /// New value.
    pub value: T,
    /// Version read by the unit of work; `None` if the row did not exist.
    pub expected_version: Option<u64>,
}

impl<T> VersionedWrite<T> {
    /// Create a versioned write.
    #[must_use]
    pub const fn new(value: T, expected_version: Option<u64>) -> Self {
        Self {
            value,
            expected_version,
        }
    }
}

/// One unit of work: the transaction's new state plus every position and
/// fund aggregate it changed.
#[derive(Debug, Clone)]
pub struct LedgerChangeSet {
    /// Transaction with its new state.
    pub transaction: VersionedWrite<Transaction>,
    /// Changed positions.
    pub positions: Vec<VersionedWrite<Position>>,
    /// Changed funds.
    pub funds: Vec<VersionedWrite<Fund>>,
}

/// Repository trait for ledger persistence.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Insert a newly submitted transaction.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the ID exists, or a storage error.
    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), RepositoryError>;

    /// Find a transaction with its version.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Versioned<Transaction>>, RepositoryError>;

    /// Pending transactions, optionally restricted to one source fund.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_pending(&self, fund: Option<&FundId>)
    -> Result<Vec<Transaction>, RepositoryError>;

    /// Find a position with its version.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_position(
        &self,
        key: &PositionKey,
    ) -> Result<Option<Versioned<Position>>, RepositoryError>;

    /// All positions held by an investor.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn positions_for_investor(
        &self,
        investor: &InvestorId,
    ) -> Result<Vec<Position>, RepositoryError>;

    /// Find a fund with its version.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_fund(&self, id: &FundId) -> Result<Option<Versioned<Fund>>, RepositoryError>;

    /// All registered funds.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn list_funds(&self) -> Result<Vec<Fund>, RepositoryError>;

    /// Register a fund or replace its NAV view. Used by seeding and by the
    /// market-data collaborator, never by settlement.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    async fn upsert_fund(&self, fund: &Fund) -> Result<(), RepositoryError>;

    /// Atomically apply a change set.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if any row's stored version differs from its
    /// expected version; nothing is written in that case.
    async fn commit(&self, changes: LedgerChangeSet) -> Result<(), RepositoryError>;
}
