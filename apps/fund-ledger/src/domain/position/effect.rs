//! Recorded ledger effects.

use serde::{Deserialize, Serialize};

use super::PositionKey;
use crate::domain::shared::{Money, Units};

/// One signed change to one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDelta {
    /// Position changed.
    pub key: PositionKey,
    /// Signed units change.
    pub units: Units,
    /// Signed cost-basis change.
    pub amount: Money,
}

impl PositionDelta {
    /// The delta that undoes this one.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            key: self.key.clone(),
            units: -self.units,
            amount: -self.amount,
        }
    }
}

/// The deltas a settlement applied, in application order.
///
/// Stored on a completed transaction so that cancellation can replay the
/// exact inverse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEffect {
    deltas: Vec<PositionDelta>,
}

impl LedgerEffect {
    /// Create an effect from deltas.
    #[must_use]
    pub const fn new(deltas: Vec<PositionDelta>) -> Self {
        Self { deltas }
    }

    /// The recorded deltas.
    #[must_use]
    pub fn deltas(&self) -> &[PositionDelta] {
        &self.deltas
    }

    /// True when no delta was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// The effect that undoes this one: inverted deltas in reverse order.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            deltas: self.deltas.iter().rev().map(PositionDelta::inverse).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::{FundId, InvestorId};
    use rust_decimal_macros::dec;

    fn delta(fund: &str, units: rust_decimal::Decimal, amount: rust_decimal::Decimal) -> PositionDelta {
        PositionDelta {
            key: PositionKey::new(InvestorId::new("inv-1"), FundId::new(fund)),
            units: Units::new(units),
            amount: Money::new(amount),
        }
    }

    #[test]
    fn inverse_flips_signs_and_order() {
        let effect = LedgerEffect::new(vec![
            delta("fund-a", dec!(-10), dec!(-1000)),
            delta("fund-b", dec!(5), dec!(1000)),
        ]);
        let inverse = effect.inverse();

        assert_eq!(inverse.deltas()[0], delta("fund-b", dec!(-5), dec!(-1000)));
        assert_eq!(inverse.deltas()[1], delta("fund-a", dec!(10), dec!(1000)));
        assert_eq!(inverse.inverse(), effect);
    }
}
