//! Units value object for fund holdings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

use crate::domain::shared::{DomainError, Money};

/// A number of fund units.
///
/// Fund units are fractional, so this wraps a Decimal rather than an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Units(Decimal);

impl Units {
    /// Create a new Units value from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Units value from a whole number.
    #[must_use]
    pub fn from_i64(amount: i64) -> Self {
        Self(Decimal::new(amount, 0))
    }

    /// Zero units.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if this quantity is positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if this quantity is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns true if this quantity is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
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
            .ok_or_else(|| DomainError::invalid_value("units", "arithmetic overflow"))
    }

    /// Value of these units at `price`, rounded once to 2 dp.
    ///
    /// # Errors
    ///
    /// Returns error if the product overflows the decimal range.
    pub fn value_at(self, price: Money) -> Result<Money, DomainError> {
        self.0
            .checked_mul(price.amount())
            .map(|amount| Money::new(amount).round())
            .ok_or_else(|| DomainError::invalid_value("amount", "arithmetic overflow"))
    }

    /// Validate that the quantity is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns error if units are zero or negative.
    pub fn validate_positive(&self, field: &str) -> Result<(), DomainError> {
        if !self.is_positive() {
            return Err(DomainError::invalid_value(field, "must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for Units {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl PartialOrd for Units {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Units {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Units {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Units {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Units {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Units {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, u| acc + u)
    }
}

impl From<Decimal> for Units {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Units> for Decimal {
    fn from(value: Units) -> Self {
        value.0
    }
}
