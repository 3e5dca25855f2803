//! Tiered fee schedule.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PricingError;
use crate::domain::shared::Money;

/// One band of a fee schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTier {
    /// Exclusive upper bound of the band. `None` marks the open-ended top band.
    pub upper_bound: Option<Decimal>,
    /// Fee rate applied to the whole amount (0.003 = 0.3%).
    pub rate: Decimal,
}

impl FeeTier {
    /// Create a bounded tier.
    #[must_use]
    pub const fn below(upper_bound: Decimal, rate: Decimal) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    /// Create the open-ended top tier.
    #[must_use]
    pub const fn above(rate: Decimal) -> Self {
        Self {
            upper_bound: None,
            rate,
        }
    }

    fn contains(&self, amount: Decimal) -> bool {
        self.upper_bound.is_none_or(|bound| amount < bound)
    }
}

/// Ordered fee tiers.
///
/// The tier whose exclusive upper bound first exceeds the amount applies, so
/// an amount equal to a bound falls into the next (cheaper) band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    tiers: Vec<FeeTier>,
}

impl FeeSchedule {
    /// Build a schedule from tiers.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidSchedule`] if the list is empty, bounds
    /// are not strictly ascending, any rate is negative, or the last tier is
    /// bounded (leaving large amounts without a rate).
    pub fn new(tiers: Vec<FeeTier>) -> Result<Self, PricingError> {
        let Some(last) = tiers.last() else {
            return Err(PricingError::InvalidSchedule {
                message: "at least one tier is required".to_string(),
            });
        };
        if last.upper_bound.is_some() {
            return Err(PricingError::InvalidSchedule {
                message: "last tier must be open-ended".to_string(),
            });
        }

        let mut previous: Option<Decimal> = None;
        for (index, tier) in tiers.iter().enumerate() {
            if tier.rate < Decimal::ZERO {
                return Err(PricingError::InvalidSchedule {
                    message: format!("tier {index} has negative rate {}", tier.rate),
                });
            }
            if index + 1 < tiers.len() {
                let Some(bound) = tier.upper_bound else {
                    return Err(PricingError::InvalidSchedule {
                        message: format!("only the last tier may be open-ended (tier {index})"),
                    });
                };
                if previous.is_some_and(|p| bound <= p) {
                    return Err(PricingError::InvalidSchedule {
                        message: format!("tier bounds must be strictly ascending (tier {index})"),
                    });
                }
                previous = Some(bound);
            }
        }

        Ok(Self { tiers })
    }

    /// The tiers in ascending order.
    #[must_use]
    pub fn tiers(&self) -> &[FeeTier] {
        &self.tiers
    }

    /// Rate applicable to `amount`.
    #[must_use]
    pub fn rate_for(&self, amount: Decimal) -> Decimal {
        self.tiers
            .iter()
            .find(|tier| tier.contains(amount))
            .map_or(Decimal::ZERO, |tier| tier.rate)
    }

    /// Compute the fee for `amount`, rounded once to 2 dp half up.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeAmount`] for negative amounts.
    pub fn tiered_fee(&self, amount: Money) -> Result<Money, PricingError> {
        if amount.is_negative() {
            return Err(PricingError::NegativeAmount {
                amount: amount.to_string(),
            });
        }
        let raw = amount.amount() * self.rate_for(amount.amount());
        Ok(Money::new(raw).round())
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            tiers: vec![
                FeeTier::below(Decimal::new(10_000_000, 0), Decimal::new(3, 3)),
                FeeTier::below(Decimal::new(20_000_000, 0), Decimal::new(2, 3)),
                FeeTier::above(Decimal::new(1, 3)),
            ],
        }
    }
}
