//! Destination leg of an exchange.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{DomainError, FundId, Money, Units};

/// Destination leg of an exchange, valued from caller-supplied pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeDestination {
    /// Fund bought.
    pub fund: FundId,
    /// Units bought.
    pub units: Units,
    /// Price per destination unit.
    pub price_per_unit: Money,
}

impl ExchangeDestination {
    /// Cost basis of the destination leg, rounded once to 2 dp.
    ///
    /// # Errors
    ///
    /// Returns error if units times price overflows.
    pub fn amount(&self) -> Result<Money, DomainError> {
        self.units.value_at(self.price_per_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_is_rounded_once() {
        let dest = ExchangeDestination {
            fund: FundId::new("fund-b"),
            units: Units::new(dec!(3.333)),
            price_per_unit: Money::new(dec!(1000.005)),
        };
        // 3.333 * 1000.005 = 3333.016665
        assert_eq!(dest.amount().unwrap().amount(), dec!(3333.02));
    }
}
