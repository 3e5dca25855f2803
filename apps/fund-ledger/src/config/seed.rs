//! Reference data loaded at startup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::fund::{Fund, NewFund};
use crate::domain::shared::{DomainError, FundId, Money};

/// A fund to register at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundSeed {
    /// Fund identifier.
    pub id: String,
    /// Venue ticker.
    pub ticker: String,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Latest published NAV.
    pub current_nav: Decimal,
    /// Previous NAV, if known.
    #[serde(default)]
    pub previous_nav: Option<Decimal>,
}

impl FundSeed {
    /// Build the fund aggregate.
    ///
    /// # Errors
    ///
    /// Returns error if the ticker is empty or a NAV is negative.
    pub fn to_fund(&self) -> Result<Fund, DomainError> {
        Fund::new(NewFund {
            id: FundId::new(self.id.clone()),
            ticker: self.ticker.clone(),
            currency: self.currency.clone(),
            current_nav: Money::new(self.current_nav),
            previous_nav: self.previous_nav.map(Money::new),
        })
    }
}

fn default_currency() -> String {
    "IDR".to_string()
}
