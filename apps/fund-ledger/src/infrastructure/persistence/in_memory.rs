//! In-memory repositories.
//!
//! Each repository keeps its rows behind a single `RwLock`, so a change set
//! is validated and applied under one write guard: either every row is
//! written with its version bumped, or nothing is.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::fund::Fund;
use crate::domain::matching::{MatchedOrderPair, MatchedPairRepository, QuantityLimit};
use crate::domain::position::{Position, PositionKey};
use crate::domain::shared::{
    FundId, InvestorId, PairId, RepositoryError, Timestamp, TransactionId, Units, Versioned,
    VenueOrderId,
};
use crate::domain::transaction::{LedgerChangeSet, LedgerRepository, Transaction, VersionedWrite};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn check_version(
    entity: &str,
    id: &str,
    stored: Option<u64>,
    expected: Option<u64>,
) -> Result<(), RepositoryError> {
    if stored == expected {
        return Ok(());
    }
    Err(RepositoryError::Conflict {
        entity: entity.to_string(),
        id: id.to_string(),
        expected,
        actual: stored,
    })
}

fn next_version(expected: Option<u64>) -> u64 {
    expected.map_or(1, |v| v + 1)
}

/// Transaction rows are stored without buffered events.
fn stored(transaction: &Transaction) -> Transaction {
    let mut copy = transaction.clone();
    copy.drain_events();
    copy
}

// ============================================================================
// Ledger
// ============================================================================

#[derive(Debug, Default)]
struct LedgerTables {
    transactions: HashMap<TransactionId, Versioned<Transaction>>,
    positions: HashMap<PositionKey, Versioned<Position>>,
    funds: HashMap<FundId, Versioned<Fund>>,
}

/// In-memory implementation of [`LedgerRepository`].
///
/// Suitable for testing and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    tables: RwLock<LedgerTables>,
}

impl InMemoryLedgerRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        read(&self.tables).transactions.len()
    }

    /// Number of stored positions, including closed ones.
    #[must_use]
    pub fn position_count(&self) -> usize {
        read(&self.tables).positions.len()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), RepositoryError> {
        let mut tables = write(&self.tables);
        if tables.transactions.contains_key(transaction.id()) {
            return Err(RepositoryError::Duplicate {
                entity: "transaction".to_string(),
                id: transaction.id().to_string(),
            });
        }
        tables.transactions.insert(
            transaction.id().clone(),
            Versioned::new(stored(transaction), 1),
        );
        Ok(())
    }

    async fn find_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Versioned<Transaction>>, RepositoryError> {
        Ok(read(&self.tables).transactions.get(id).cloned())
    }

    async fn find_pending(
        &self,
        fund: Option<&FundId>,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let tables = read(&self.tables);
        let mut pending: Vec<Transaction> = tables
            .transactions
            .values()
            .map(|row| &row.value)
            .filter(|tx| tx.is_pending())
            .filter(|tx| fund.is_none_or(|f| tx.fund() == f))
            .cloned()
            .collect();
        pending.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(pending)
    }

    async fn find_position(
        &self,
        key: &PositionKey,
    ) -> Result<Option<Versioned<Position>>, RepositoryError> {
        Ok(read(&self.tables).positions.get(key).cloned())
    }

    async fn positions_for_investor(
        &self,
        investor: &InvestorId,
    ) -> Result<Vec<Position>, RepositoryError> {
        let tables = read(&self.tables);
        let mut positions: Vec<Position> = tables
            .positions
            .values()
            .filter(|row| row.value.investor() == investor)
            .map(|row| row.value.clone())
            .collect();
        positions.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(positions)
    }

    async fn find_fund(&self, id: &FundId) -> Result<Option<Versioned<Fund>>, RepositoryError> {
        Ok(read(&self.tables).funds.get(id).cloned())
    }

    async fn list_funds(&self) -> Result<Vec<Fund>, RepositoryError> {
        let tables = read(&self.tables);
        let mut funds: Vec<Fund> = tables.funds.values().map(|row| row.value.clone()).collect();
        funds.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(funds)
    }

    async fn upsert_fund(&self, fund: &Fund) -> Result<(), RepositoryError> {
        let mut tables = write(&self.tables);
        let version = tables.funds.get(fund.id()).map_or(1, |row| row.version + 1);
        tables
            .funds
            .insert(fund.id().clone(), Versioned::new(fund.clone(), version));
        Ok(())
    }

    async fn commit(&self, changes: LedgerChangeSet) -> Result<(), RepositoryError> {
        let mut tables = write(&self.tables);

        // Validate every row before touching any of them.
        let tx = &changes.transaction;
        check_version(
            "transaction",
            tx.value.id().as_str(),
            tables.transactions.get(tx.value.id()).map(|row| row.version),
            tx.expected_version,
        )?;
        for VersionedWrite {
            value,
            expected_version,
        } in &changes.positions
        {
            check_version(
                "position",
                &value.key().to_string(),
                tables.positions.get(value.key()).map(|row| row.version),
                *expected_version,
            )?;
        }
        for VersionedWrite {
            value,
            expected_version,
        } in &changes.funds
        {
            check_version(
                "fund",
                value.id().as_str(),
                tables.funds.get(value.id()).map(|row| row.version),
                *expected_version,
            )?;
        }

        let LedgerChangeSet {
            transaction,
            positions,
            funds,
        } = changes;

        tables.transactions.insert(
            transaction.value.id().clone(),
            Versioned::new(
                stored(&transaction.value),
                next_version(transaction.expected_version),
            ),
        );
        for row in positions {
            tables.positions.insert(
                row.value.key().clone(),
                Versioned::new(row.value, next_version(row.expected_version)),
            );
        }
        for row in funds {
            tables.funds.insert(
                row.value.id().clone(),
                Versioned::new(row.value, next_version(row.expected_version)),
            );
        }
        Ok(())
    }
}

// ============================================================================
// Matched pairs
// ============================================================================

#[derive(Debug)]
struct PairRow {
    pair: MatchedOrderPair,
    /// Insertion sequence; pairs from one cycle share a creation time.
    seq: u64,
    parked: Option<String>,
}

#[derive(Debug, Default)]
struct PairTable {
    rows: HashMap<PairId, PairRow>,
    next_seq: u64,
}

impl PairTable {
    fn pairs(&self) -> impl Iterator<Item = &MatchedOrderPair> {
        self.rows.values().map(|row| &row.pair)
    }

    fn sorted<'a>(&'a self, keep: impl Fn(&PairRow) -> bool) -> Vec<&'a PairRow> {
        let mut rows: Vec<&PairRow> = self.rows.values().filter(|row| keep(row)).collect();
        rows.sort_by_key(|row| row.seq);
        rows
    }
}

/// In-memory implementation of [`MatchedPairRepository`].
///
/// Pairs are listed in insertion order, which is the matcher's FIFO order.
#[derive(Debug, Default)]
pub struct InMemoryMatchedPairRepository {
    table: RwLock<PairTable>,
}

impl InMemoryMatchedPairRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.table).rows.len()
    }

    /// Returns true if no pair is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        read(&self.table).rows.is_empty()
    }

    /// Why a pair was taken out of automatic dispatch, if it was.
    #[must_use]
    pub fn parked_reason(&self, id: &PairId) -> Option<String> {
        read(&self.table)
            .rows
            .get(id)
            .and_then(|row| row.parked.clone())
    }
}

fn matched_total<'a>(
    pairs: impl Iterator<Item = &'a MatchedOrderPair>,
    transaction: &TransactionId,
) -> Units {
    pairs
        .filter(|p| p.references(transaction))
        .map(MatchedOrderPair::matched_quantity)
        .sum()
}

fn pair_not_found(id: &PairId) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "matched_pair".to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl MatchedPairRepository for InMemoryMatchedPairRepository {
    async fn insert_pairs(
        &self,
        new_pairs: &[MatchedOrderPair],
        limits: &[QuantityLimit],
    ) -> Result<(), RepositoryError> {
        let mut table = write(&self.table);

        for pair in new_pairs {
            if table.rows.contains_key(pair.id()) {
                return Err(RepositoryError::Duplicate {
                    entity: "matched_pair".to_string(),
                    id: pair.id().to_string(),
                });
            }
        }
        for limit in limits {
            let total = matched_total(table.pairs().chain(new_pairs.iter()), &limit.transaction_id);
            if total > limit.units {
                return Err(RepositoryError::Conflict {
                    entity: "matched_quantity".to_string(),
                    id: limit.transaction_id.to_string(),
                    expected: None,
                    actual: None,
                });
            }
        }

        for pair in new_pairs {
            let seq = table.next_seq;
            table.next_seq += 1;
            table.rows.insert(
                pair.id().clone(),
                PairRow {
                    pair: pair.clone(),
                    seq,
                    parked: None,
                },
            );
        }
        Ok(())
    }

    async fn find_pair(&self, id: &PairId) -> Result<Option<MatchedOrderPair>, RepositoryError> {
        Ok(read(&self.table).rows.get(id).map(|row| row.pair.clone()))
    }

    async fn mark_sent(
        &self,
        id: &PairId,
        venue_order_id: VenueOrderId,
        at: Timestamp,
    ) -> Result<bool, RepositoryError> {
        let mut table = write(&self.table);
        let row = table.rows.get_mut(id).ok_or_else(|| pair_not_found(id))?;
        if row.pair.mark_sent(venue_order_id, at).is_err() {
            return Ok(false);
        }
        row.parked = None;
        Ok(true)
    }

    async fn park(&self, id: &PairId, reason: &str) -> Result<bool, RepositoryError> {
        let mut table = write(&self.table);
        let row = table.rows.get_mut(id).ok_or_else(|| pair_not_found(id))?;
        if row.pair.is_sent() {
            return Ok(false);
        }
        row.parked = Some(reason.to_string());
        Ok(true)
    }

    async fn matched_quantities(
        &self,
        ids: &[TransactionId],
    ) -> Result<HashMap<TransactionId, Units>, RepositoryError> {
        let table = read(&self.table);
        Ok(ids
            .iter()
            .map(|id| (id.clone(), matched_total(table.pairs(), id)))
            .filter(|(_, total)| total.is_positive())
            .collect())
    }

    async fn find_unsent(&self, limit: usize) -> Result<Vec<MatchedOrderPair>, RepositoryError> {
        let table = read(&self.table);
        Ok(table
            .sorted(|row| !row.pair.is_sent() && row.parked.is_none())
            .into_iter()
            .take(limit)
            .map(|row| row.pair.clone())
            .collect())
    }

    async fn pairs_for_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<Vec<MatchedOrderPair>, RepositoryError> {
        let table = read(&self.table);
        Ok(table
            .sorted(|row| row.pair.references(id))
            .into_iter()
            .map(|row| row.pair.clone())
            .collect())
    }
}
