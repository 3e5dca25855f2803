//! FIFO order matcher.
//!
//! Pure pairing logic: no I/O, no clock reads. The caller supplies pending
//! transactions and the quantity already matched for each of them.

use std::collections::HashMap;

use super::{MatchedOrderPair, MatchingError};
use crate::domain::shared::{FundId, Timestamp, TransactionId, Units};
use crate::domain::transaction::{Transaction, TransactionType};

/// One side of the book: a pending transaction's outstanding quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    /// Transaction ID.
    pub transaction_id: TransactionId,
    /// Submission time, used for FIFO ordering.
    pub created_at: Timestamp,
    /// Units not yet covered by any pair.
    pub outstanding: Units,
}

/// FIFO matcher for a single fund.
pub struct OrderMatcher;

impl OrderMatcher {
    /// Build buy and sell candidates for `fund` from pending transactions.
    ///
    /// Transactions that are not pending, belong to another fund, are not
    /// purchases or sells, or have no outstanding quantity are skipped.
    /// Both sides come back ordered by `(created_at, transaction_id)`.
    #[must_use]
    pub fn candidates(
        fund: &FundId,
        transactions: &[Transaction],
        matched: &HashMap<TransactionId, Units>,
    ) -> (Vec<MatchCandidate>, Vec<MatchCandidate>) {
        let mut buys = Vec::new();
        let mut sells = Vec::new();

        for tx in transactions {
            if tx.fund() != fund || !tx.is_pending() || !tx.transaction_type().is_matchable() {
                continue;
            }
            let already = matched.get(tx.id()).copied().unwrap_or(Units::ZERO);
            let outstanding = tx.units() - already;
            if !outstanding.is_positive() {
                continue;
            }
            let candidate = MatchCandidate {
                transaction_id: tx.id().clone(),
                created_at: tx.created_at(),
                outstanding,
            };
            match tx.transaction_type() {
                TransactionType::Purchase => buys.push(candidate),
                TransactionType::Sell => sells.push(candidate),
                TransactionType::Exchange => {}
            }
        }

        Self::sort_fifo(&mut buys);
        Self::sort_fifo(&mut sells);
        (buys, sells)
    }

    /// Pair candidates oldest-first until either side runs out.
    ///
    /// Each pair takes `min(remaining buy, remaining sell)`; the exhausted
    /// side advances. Inputs are re-sorted, so caller order does not matter.
    ///
    /// # Errors
    ///
    /// Returns error only if a pair cannot be constructed, which would mean a
    /// candidate carried a non-positive outstanding quantity.
    pub fn pair(
        fund: &FundId,
        mut buys: Vec<MatchCandidate>,
        mut sells: Vec<MatchCandidate>,
        now: Timestamp,
    ) -> Result<Vec<MatchedOrderPair>, MatchingError> {
        buys.retain(|c| c.outstanding.is_positive());
        sells.retain(|c| c.outstanding.is_positive());
        Self::sort_fifo(&mut buys);
        Self::sort_fifo(&mut sells);

        let mut pairs = Vec::new();
        let (mut b, mut s) = (0, 0);
        while b < buys.len() && s < sells.len() {
            let quantity = buys[b].outstanding.min(sells[s].outstanding);
            pairs.push(MatchedOrderPair::new(
                fund.clone(),
                buys[b].transaction_id.clone(),
                sells[s].transaction_id.clone(),
                quantity,
                now,
            )?);

            buys[b].outstanding = buys[b].outstanding - quantity;
            sells[s].outstanding = sells[s].outstanding - quantity;
            if buys[b].outstanding.is_zero() {
                b += 1;
            }
            if sells[s].outstanding.is_zero() {
                s += 1;
            }
        }
        Ok(pairs)
    }

    /// Candidates and pairs in one step.
    ///
    /// # Errors
    ///
    /// See [`OrderMatcher::pair`].
    pub fn match_fund(
        fund: &FundId,
        transactions: &[Transaction],
        matched: &HashMap<TransactionId, Units>,
        now: Timestamp,
    ) -> Result<Vec<MatchedOrderPair>, MatchingError> {
        let (buys, sells) = Self::candidates(fund, transactions, matched);
        Self::pair(fund, buys, sells, now)
    }

    fn sort_fifo(side: &mut [MatchCandidate]) {
        side.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });
    }
}
