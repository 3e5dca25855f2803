//! Money value object for currency amounts.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

use crate::domain::shared::DomainError;

/// Number of decimal places persisted for monetary values.
pub const MONEY_SCALE: u32 = 2;

/// A monetary amount in the fund's currency.
///
/// Represented as a Decimal so totals are reproducible across repeated
/// recomputation. Values are rounded half-up to [`MONEY_SCALE`] only at the
/// point of persistence, via [`Money::round`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Create a new Money value from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Money value from minor units (cents).
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, MONEY_SCALE))
    }

    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if this amount is positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if this amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns true if this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Round half-up (away from zero) to 2 decimal places.
    #[must_use]
    pub fn round(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns error if the result overflows the decimal range.
    pub fn checked_add(self, rhs: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| DomainError::invalid_value("money", "arithmetic overflow"))
    }

    /// Validate that the amount is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns error if the amount is zero or negative.
    pub fn validate_positive(&self, field: &str) -> Result<(), DomainError> {
        if !self.is_positive() {
            return Err(DomainError::invalid_value(field, "must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_display_two_places() {
        assert_eq!(format!("{}", Money::new(dec!(150.5))), "150.50");
        assert_eq!(format!("{}", Money::from_minor(15050)), "150.50");
    }

    #[test]
    fn money_round_is_half_up() {
        assert_eq!(Money::new(dec!(0.125)).round().amount(), dec!(0.13));
        assert_eq!(Money::new(dec!(0.135)).round().amount(), dec!(0.14));
        assert_eq!(Money::new(dec!(-0.125)).round().amount(), dec!(-0.13));
        assert_eq!(Money::new(dec!(0.124)).round().amount(), dec!(0.12));
    }

    #[test]
    fn money_arithmetic() {
        let a = Money::new(dec!(100));
        let b = Money::new(dec!(30.25));

        assert_eq!((a + b).amount(), dec!(130.25));
        assert_eq!((a - b).amount(), dec!(69.75));
        assert_eq!((-a).amount(), dec!(-100));
    }

    #[test]
    fn money_sum() {
        let total: Money = [dec!(1.10), dec!(2.20), dec!(3.30)]
            .into_iter()
            .map(Money::new)
            .sum();
        assert_eq!(total.amount(), dec!(6.60));
    }

    #[test]
    fn money_checked_add_overflow() {
        let max = Money::new(Decimal::MAX);
        assert!(max.checked_add(Money::new(dec!(1))).is_err());
    }

    #[test]
    fn money_validate_positive() {
        assert!(Money::new(dec!(0.01)).validate_positive("price").is_ok());
        assert!(Money::ZERO.validate_positive("price").is_err());
        assert!(Money::new(dec!(-1)).validate_positive("price").is_err());
    }

    #[test]
    fn money_serde_roundtrip() {
        let m = Money::new(dec!(150.50));
        let json = serde_json::to_string(&m).unwrap();
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, m);
    }
}
