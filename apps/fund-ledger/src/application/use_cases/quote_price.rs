//! Quote Price Use Case
//!
//! Proposes a per-unit price for a new order: the fund's latest NAV rounded
//! to the configured price step. The quote is advisory; settlement uses the
//! price recorded on the transaction.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::ports::NavProviderPort;
use crate::domain::pricing::round_price_to_step;
use crate::domain::shared::{FundId, Money};
use crate::error::LedgerError;

/// Use case for proposing order prices.
pub struct QuotePriceUseCase<N>
where
    N: NavProviderPort,
{
    nav_provider: Arc<N>,
    price_step: Decimal,
}

impl<N> QuotePriceUseCase<N>
where
    N: NavProviderPort,
{
    /// Create a new `QuotePriceUseCase`.
    pub const fn new(nav_provider: Arc<N>, price_step: Decimal) -> Self {
        Self {
            nav_provider,
            price_step,
        }
    }

    /// Latest NAV for `fund`, rounded to the price step.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` if the fund has no published NAV, `SERVICE_UNAVAILABLE`
    /// if the provider cannot be reached.
    pub async fn propose_price(&self, fund: &FundId) -> Result<Money, LedgerError> {
        let nav = self.nav_provider.current_nav(fund).await?;
        let price = round_price_to_step(nav, self.price_step)?;
        tracing::debug!(fund = %fund, nav = %nav, price = %price, "Price proposed");
        Ok(price)
    }
}
