//! Pricing Bounded Context
//!
//! Pure functions for price rounding and tiered fee computation. Nothing here
//! holds state; every function operates on exact fixed-point decimals.
//!
//! # Key Concepts
//!
//! - **Price step**: Proposed prices are rounded to the nearest multiple of a
//!   step (default 50), ties rounding away from zero
//! - **Fee schedule**: Tiered rates that decrease as the amount crosses
//!   thresholds; a threshold value belongs to the tier above it

pub mod errors;
pub mod fee_schedule;
pub mod rounding;

pub use errors::PricingError;
pub use fee_schedule::{FeeSchedule, FeeTier};
pub use rounding::{DEFAULT_PRICE_STEP, round_money, round_price_to_step};
