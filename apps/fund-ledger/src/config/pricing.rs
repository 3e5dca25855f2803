//! Price rounding and fee configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::pricing::{DEFAULT_PRICE_STEP, FeeSchedule, FeeTier, PricingError};

/// Pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Step proposed prices are rounded to.
    #[serde(default = "default_price_step")]
    pub price_step: Decimal,
    /// Fee bands, ascending; the last band has no upper bound.
    #[serde(default = "default_fee_tiers")]
    pub fee_tiers: Vec<FeeTierConfig>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_step: default_price_step(),
            fee_tiers: default_fee_tiers(),
        }
    }
}

impl PricingConfig {
    /// Build the fee schedule described by `fee_tiers`.
    ///
    /// # Errors
    ///
    /// Returns error if the bands are not a valid schedule.
    pub fn fee_schedule(&self) -> Result<FeeSchedule, PricingError> {
        FeeSchedule::new(
            self.fee_tiers
                .iter()
                .map(|t| FeeTier {
                    upper_bound: t.upper_bound,
                    rate: t.rate,
                })
                .collect(),
        )
    }
}

/// One fee band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTierConfig {
    /// Exclusive upper bound; omitted for the top band.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Rate applied to the whole amount.
    pub rate: Decimal,
}

const fn default_price_step() -> Decimal {
    DEFAULT_PRICE_STEP
}

fn default_fee_tiers() -> Vec<FeeTierConfig> {
    FeeSchedule::default()
        .tiers()
        .iter()
        .map(|t| FeeTierConfig {
            upper_bound: t.upper_bound,
            rate: t.rate,
        })
        .collect()
}
