//! Price and currency rounding.

use rust_decimal::{Decimal, RoundingStrategy};

use super::PricingError;
use crate::domain::shared::Money;

/// Default price step, in currency units.
pub const DEFAULT_PRICE_STEP: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Round `value` to the nearest multiple of `step`.
///
/// Ties round away from zero (half up), so `1025` with a step of `50` becomes
/// `1050` while `1024` becomes `1000`.
///
/// # Errors
///
/// Returns [`PricingError::InvalidStep`] if `step` is not strictly positive.
pub fn round_price_to_step(value: Money, step: Decimal) -> Result<Money, PricingError> {
    if step <= Decimal::ZERO {
        return Err(PricingError::InvalidStep {
            step: step.to_string(),
        });
    }
    let steps = (value.amount() / step).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    Ok(Money::new(steps * step))
}

/// Round a raw decimal to a persisted currency amount (2 dp, half up).
#[must_use]
pub fn round_money(value: Decimal) -> Money {
    Money::new(value).round()
}
