//! Position entity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{FundId, InvestorId, Money, Timestamp, Units};

/// Key of a position: one investor in one fund.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    /// Investor holding the units.
    pub investor: InvestorId,
    /// Fund held.
    pub fund: FundId,
}

impl PositionKey {
    /// Create a position key.
    #[must_use]
    pub const fn new(investor: InvestorId, fund: FundId) -> Self {
        Self { investor, fund }
    }
}

impl std::fmt::Display for PositionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.investor, self.fund)
    }
}

/// An investor's holding in one fund.
///
/// Created lazily on first purchase and never deleted; a fully sold position
/// stays with zero units and zero amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    key: PositionKey,
    units: Units,
    amount: Money,
    updated_at: Timestamp,
}

impl Position {
    /// An empty position, as seen before the first purchase.
    #[must_use]
    pub fn empty(key: PositionKey) -> Self {
        Self {
            key,
            units: Units::ZERO,
            amount: Money::ZERO,
            updated_at: Timestamp::now(),
        }
    }

    /// Rebuild a position from stored state.
    #[must_use]
    pub const fn reconstitute(
        key: PositionKey,
        units: Units,
        amount: Money,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            key,
            units,
            amount,
            updated_at,
        }
    }

    /// Get the position key.
    #[must_use]
    pub const fn key(&self) -> &PositionKey {
        &self.key
    }

    /// Get the investor.
    #[must_use]
    pub const fn investor(&self) -> &InvestorId {
        &self.key.investor
    }

    /// Get the fund.
    #[must_use]
    pub const fn fund(&self) -> &FundId {
        &self.key.fund
    }

    /// Get the units held.
    #[must_use]
    pub const fn units(&self) -> Units {
        self.units
    }

    /// Get the total cost basis.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Weighted-average cost per unit, `amount / units`, or zero when flat.
    #[must_use]
    pub fn average_price(&self) -> Money {
        if self.units.is_zero() {
            return Money::ZERO;
        }
        Money::new(self.amount.amount() / self.units.amount())
    }

    /// True when the position holds no units.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.units.is_zero()
    }

    pub(super) fn with_values(&self, units: Units, amount: Money, at: Timestamp) -> Self {
        Self {
            key: self.key.clone(),
            units,
            amount,
            updated_at: at,
        }
    }
}

/// Proportional cost removed when selling `units` out of `position`.
///
/// Selling the whole holding removes the whole cost basis; partial sells
/// round the proportional cost once to 2 dp.
#[must_use]
pub fn proportional_cost(position: &Position, units: Units) -> Money {
    if units == position.units() {
        return position.amount();
    }
    if position.units().is_zero() {
        return Money::ZERO;
    }
    let ratio: Decimal = units.amount() / position.units().amount();
    Money::new(position.amount().amount() * ratio).round()
}
