//! Fund Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{DomainError, FundId, Money, Units};

/// Parameters for registering a fund.
#[derive(Debug, Clone)]
pub struct NewFund {
    /// Fund identifier.
    pub id: FundId,
    /// Ticker symbol quoted by the execution venue.
    pub ticker: String,
    /// ISO currency code.
    pub currency: String,
    /// Latest published NAV.
    pub current_nav: Money,
    /// NAV before the latest publication, if known.
    pub previous_nav: Option<Money>,
}

/// Fund aggregate.
///
/// `total_units` is the sum of every investor position in the fund and is
/// changed only by settlement, through [`Fund::apply_units_delta`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    id: FundId,
    ticker: String,
    currency: String,
    current_nav: Money,
    previous_nav: Money,
    total_units: Units,
}

impl Fund {
    /// Register a new fund with zero outstanding units.
    ///
    /// # Errors
    ///
    /// Returns error if the ticker is empty or a NAV is negative.
    pub fn new(params: NewFund) -> Result<Self, DomainError> {
        if params.ticker.trim().is_empty() {
            return Err(DomainError::invalid_value("ticker", "must not be empty"));
        }
        if params.current_nav.is_negative() {
            return Err(DomainError::invalid_value("current_nav", "must not be negative"));
        }
        let previous_nav = params.previous_nav.unwrap_or(params.current_nav);
        if previous_nav.is_negative() {
            return Err(DomainError::invalid_value("previous_nav", "must not be negative"));
        }

        Ok(Self {
            id: params.id,
            ticker: params.ticker,
            currency: params.currency,
            current_nav: params.current_nav,
            previous_nav,
            total_units: Units::ZERO,
        })
    }

    /// Get the fund ID.
    #[must_use]
    pub const fn id(&self) -> &FundId {
        &self.id
    }

    /// Get the ticker.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Get the currency.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Get the latest published NAV.
    #[must_use]
    pub const fn current_nav(&self) -> Money {
        self.current_nav
    }

    /// Get the previous NAV.
    #[must_use]
    pub const fn previous_nav(&self) -> Money {
        self.previous_nav
    }

    /// Get the units outstanding across all investors.
    #[must_use]
    pub const fn total_units(&self) -> Units {
        self.total_units
    }

    /// Absolute NAV change since the previous publication.
    #[must_use]
    pub fn nav_change(&self) -> Money {
        self.current_nav - self.previous_nav
    }

    /// NAV change in percent, rounded to 2 dp. Zero when there is no prior NAV.
    #[must_use]
    pub fn nav_change_percent(&self) -> Decimal {
        if self.previous_nav.is_zero() {
            return Decimal::ZERO;
        }
        let pct = self.nav_change().amount() / self.previous_nav.amount() * Decimal::ONE_HUNDRED;
        Money::new(pct).round().amount()
    }

    /// Apply a signed change to the outstanding units.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if the total would go negative; the
    /// fund is left unchanged.
    pub fn apply_units_delta(&mut self, delta: Units) -> Result<(), DomainError> {
        let next = self.total_units.checked_add(delta)?;
        if next.is_negative() {
            return Err(DomainError::InvariantViolation {
                aggregate: "Fund".to_string(),
                invariant: "total_units >= 0".to_string(),
                state: format!("fund={} total_units={} delta={delta}", self.id, self.total_units),
            });
        }
        self.total_units = next;
        Ok(())
    }
}
