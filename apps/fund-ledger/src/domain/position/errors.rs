//! Position ledger errors.

use std::fmt;

/// Errors that can occur while applying or reversing ledger deltas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// A sell or reversal needs more units than the position holds.
    InsufficientUnits {
        /// Investor ID.
        investor: String,
        /// Fund ID.
        fund: String,
        /// Units required.
        requested: String,
        /// Units held.
        available: String,
    },

    /// A reversal would leave a negative cost basis, or cost with no units.
    CostBasisUnderflow {
        /// Investor ID.
        investor: String,
        /// Fund ID.
        fund: String,
        /// Resulting units.
        units: String,
        /// Resulting amount.
        amount: String,
    },

    /// A fund's outstanding unit total would go negative.
    FundUnitsUnderflow {
        /// Fund ID.
        fund: String,
        /// Invariant details.
        details: String,
    },

    /// Fund is not part of the working set.
    UnknownFund {
        /// Fund ID.
        fund: String,
    },

    /// Invalid delta input.
    InvalidInput {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientUnits {
                investor,
                fund,
                requested,
                available,
            } => {
                write!(
                    f,
                    "Insufficient units for investor {investor} in fund {fund}: requested {requested}, available {available}"
                )
            }
            Self::CostBasisUnderflow {
                investor,
                fund,
                units,
                amount,
            } => {
                write!(
                    f,
                    "Cost basis underflow for investor {investor} in fund {fund}: units {units}, amount {amount}"
                )
            }
            Self::FundUnitsUnderflow { fund, details } => {
                write!(f, "Fund {fund} total units would go negative: {details}")
            }
            Self::UnknownFund { fund } => {
                write!(f, "Fund not loaded in ledger: {fund}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid ledger input '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for PositionError {}
