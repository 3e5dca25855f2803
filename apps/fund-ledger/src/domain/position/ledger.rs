//! Position ledger working set.
//!
//! The ledger holds the positions and funds a unit of work has loaded. Each
//! operation turns its input into a [`LedgerEffect`], stages every delta
//! against copies of the affected rows, and only merges the staged rows back
//! once all deltas have passed their invariants. A failing exchange therefore
//! leaves the source leg untouched.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use super::position::proportional_cost;
use super::{LedgerEffect, Position, PositionDelta, PositionError, PositionKey};
use crate::domain::fund::Fund;
use crate::domain::shared::{DomainError, FundId, InvestorId, Money, Timestamp, Units};

/// Working set of positions and fund aggregates for one unit of work.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    positions: BTreeMap<PositionKey, Position>,
    funds: BTreeMap<FundId, Fund>,
    changed_positions: BTreeSet<PositionKey>,
    changed_funds: BTreeSet<FundId>,
}

impl PositionLedger {
    /// Create an empty working set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a stored position into the working set.
    pub fn load_position(&mut self, position: Position) {
        self.positions.insert(position.key().clone(), position);
    }

    /// Load a fund into the working set.
    pub fn load_fund(&mut self, fund: Fund) {
        self.funds.insert(fund.id().clone(), fund);
    }

    /// Current position for `key`; an empty position if none was loaded.
    #[must_use]
    pub fn position(&self, key: &PositionKey) -> Position {
        self.positions
            .get(key)
            .cloned()
            .unwrap_or_else(|| Position::empty(key.clone()))
    }

    /// Fund loaded under `id`.
    #[must_use]
    pub fn fund(&self, id: &FundId) -> Option<&Fund> {
        self.funds.get(id)
    }

    /// Positions modified by this working set, in key order.
    #[must_use]
    pub fn changed_positions(&self) -> Vec<Position> {
        self.changed_positions
            .iter()
            .filter_map(|key| self.positions.get(key).cloned())
            .collect()
    }

    /// Funds modified by this working set, in id order.
    #[must_use]
    pub fn changed_funds(&self) -> Vec<Fund> {
        self.changed_funds
            .iter()
            .filter_map(|id| self.funds.get(id).cloned())
            .collect()
    }

    /// Add `units` bought for `amount` to the investor's position.
    ///
    /// # Errors
    ///
    /// Returns error if units are not positive, the amount is negative, or
    /// the fund is not loaded.
    pub fn apply_purchase(
        &mut self,
        investor: &InvestorId,
        fund: &FundId,
        units: Units,
        amount: Money,
    ) -> Result<(Position, LedgerEffect), PositionError> {
        let delta = Self::purchase_delta(investor, fund, units, amount)?;
        let key = delta.key.clone();
        let effect = LedgerEffect::new(vec![delta]);
        self.apply_effect(&effect)?;
        Ok((self.position(&key), effect))
    }

    /// Remove `units` from the investor's position at weighted-average cost.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError::InsufficientUnits`] if the position holds
    /// fewer than `units`.
    pub fn apply_sell(
        &mut self,
        investor: &InvestorId,
        fund: &FundId,
        units: Units,
    ) -> Result<(Position, LedgerEffect), PositionError> {
        let delta = self.sell_delta(investor, fund, units)?;
        let key = delta.key.clone();
        let effect = LedgerEffect::new(vec![delta]);
        self.apply_effect(&effect)?;
        Ok((self.position(&key), effect))
    }

    /// Sell the source leg and buy the destination leg as one unit.
    ///
    /// Returns the source and destination positions after the exchange.
    ///
    /// # Errors
    ///
    /// Returns error if either leg fails; neither leg is applied in that case.
    pub fn apply_exchange(
        &mut self,
        investor: &InvestorId,
        source_fund: &FundId,
        source_units: Units,
        destination_fund: &FundId,
        destination_units: Units,
        destination_amount: Money,
    ) -> Result<(Position, Position, LedgerEffect), PositionError> {
        if source_fund == destination_fund {
            return Err(PositionError::InvalidInput {
                field: "destination_fund".to_string(),
                message: "must differ from the source fund".to_string(),
            });
        }
        let sell = self.sell_delta(investor, source_fund, source_units)?;
        let purchase =
            Self::purchase_delta(investor, destination_fund, destination_units, destination_amount)?;
        let source_key = sell.key.clone();
        let destination_key = purchase.key.clone();

        let effect = LedgerEffect::new(vec![sell, purchase]);
        self.apply_effect(&effect)?;
        Ok((
            self.position(&source_key),
            self.position(&destination_key),
            effect,
        ))
    }

    /// Undo a previously applied effect by replaying its inverse.
    ///
    /// Returns the positions touched by the reversal.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError::InsufficientUnits`] or
    /// [`PositionError::CostBasisUnderflow`] if the units or cost have since
    /// been consumed; nothing is applied in that case.
    pub fn reverse(&mut self, effect: &LedgerEffect) -> Result<Vec<Position>, PositionError> {
        let inverse = effect.inverse();
        self.apply_effect(&inverse)?;

        let mut seen = BTreeSet::new();
        Ok(inverse
            .deltas()
            .iter()
            .filter(|delta| seen.insert(delta.key.clone()))
            .map(|delta| self.position(&delta.key))
            .collect())
    }

    fn purchase_delta(
        investor: &InvestorId,
        fund: &FundId,
        units: Units,
        amount: Money,
    ) -> Result<PositionDelta, PositionError> {
        if !units.is_positive() {
            return Err(PositionError::InvalidInput {
                field: "units".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if amount.is_negative() {
            return Err(PositionError::InvalidInput {
                field: "amount".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        Ok(PositionDelta {
            key: PositionKey::new(investor.clone(), fund.clone()),
            units,
            amount,
        })
    }

    fn sell_delta(
        &self,
        investor: &InvestorId,
        fund: &FundId,
        units: Units,
    ) -> Result<PositionDelta, PositionError> {
        if !units.is_positive() {
            return Err(PositionError::InvalidInput {
                field: "units".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        let key = PositionKey::new(investor.clone(), fund.clone());
        let current = self.position(&key);
        if units > current.units() {
            return Err(PositionError::InsufficientUnits {
                investor: investor.to_string(),
                fund: fund.to_string(),
                requested: units.to_string(),
                available: current.units().to_string(),
            });
        }
        let cost = proportional_cost(&current, units);
        Ok(PositionDelta {
            key,
            units: -units,
            amount: -cost,
        })
    }

    /// Stage every delta, then merge. Nothing is written if any delta fails.
    fn apply_effect(&mut self, effect: &LedgerEffect) -> Result<(), PositionError> {
        let now = Timestamp::now();
        let mut staged_positions: BTreeMap<PositionKey, Position> = BTreeMap::new();
        let mut staged_funds: BTreeMap<FundId, Fund> = BTreeMap::new();

        for delta in effect.deltas() {
            let current = staged_positions
                .get(&delta.key)
                .cloned()
                .unwrap_or_else(|| self.position(&delta.key));
            let units = current
                .units()
                .checked_add(delta.units)
                .map_err(|e| overflow("units", &e))?;
            let amount = current
                .amount()
                .checked_add(delta.amount)
                .map_err(|e| overflow("amount", &e))?;

            if units.is_negative() {
                return Err(PositionError::InsufficientUnits {
                    investor: delta.key.investor.to_string(),
                    fund: delta.key.fund.to_string(),
                    requested: (-delta.units).to_string(),
                    available: current.units().to_string(),
                });
            }
            if amount.is_negative() || (units.is_zero() && !amount.is_zero()) {
                return Err(PositionError::CostBasisUnderflow {
                    investor: delta.key.investor.to_string(),
                    fund: delta.key.fund.to_string(),
                    units: units.to_string(),
                    amount: amount.to_string(),
                });
            }
            staged_positions.insert(delta.key.clone(), current.with_values(units, amount, now));

            let fund = match staged_funds.entry(delta.key.fund.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let Some(loaded) = self.funds.get(entry.key()).cloned() else {
                        return Err(PositionError::UnknownFund {
                            fund: entry.key().to_string(),
                        });
                    };
                    entry.insert(loaded)
                }
            };
            fund.apply_units_delta(delta.units).map_err(|e| match e {
                DomainError::InvalidValue { .. } => overflow("total_units", &e),
                DomainError::InvariantViolation { .. } => PositionError::FundUnitsUnderflow {
                    fund: delta.key.fund.to_string(),
                    details: e.to_string(),
                },
            })?;
        }

        for (key, position) in staged_positions {
            self.changed_positions.insert(key.clone());
            self.positions.insert(key, position);
        }
        for (id, fund) in staged_funds {
            self.changed_funds.insert(id.clone());
            self.funds.insert(id, fund);
        }
        Ok(())
    }
}

fn overflow(field: &str, error: &DomainError) -> PositionError {
    PositionError::InvalidInput {
        field: field.to_string(),
        message: error.to_string(),
    }
}
