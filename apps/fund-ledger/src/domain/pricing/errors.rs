//! Pricing errors.

use std::fmt;

/// Errors that can occur while rounding prices or building fee schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Rounding step was zero or negative.
    InvalidStep {
        /// Step that was supplied.
        step: String,
    },

    /// Fee schedule is malformed.
    InvalidSchedule {
        /// Error message.
        message: String,
    },

    /// Amount passed to the fee engine was negative.
    NegativeAmount {
        /// Amount that was supplied.
        amount: String,
    },
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStep { step } => {
                write!(f, "Price step must be positive, got {step}")
            }
            Self::InvalidSchedule { message } => {
                write!(f, "Invalid fee schedule: {message}")
            }
            Self::NegativeAmount { amount } => {
                write!(f, "Fee amount must not be negative, got {amount}")
            }
        }
    }
}

impl std::error::Error for PricingError {}
