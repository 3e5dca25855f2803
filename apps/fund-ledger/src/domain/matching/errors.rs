//! Matching errors.

use std::fmt;

/// Errors that can occur while building or updating matched pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    /// Matched quantity must be positive.
    InvalidQuantity {
        /// Quantity supplied.
        quantity: String,
    },

    /// Pair is already marked as sent.
    AlreadySent {
        /// Pair ID.
        pair_id: String,
    },

    /// Candidate does not belong to the fund being matched.
    FundMismatch {
        /// Transaction ID.
        transaction_id: String,
        /// Fund being matched.
        expected: String,
        /// Transaction's fund.
        actual: String,
    },
}

impl fmt::Display for MatchingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidQuantity { quantity } => {
                write!(f, "Matched quantity must be positive, got {quantity}")
            }
            Self::AlreadySent { pair_id } => {
                write!(f, "Pair {pair_id} is already sent to the exchange")
            }
            Self::FundMismatch {
                transaction_id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Transaction {transaction_id} belongs to fund {actual}, not {expected}"
                )
            }
        }
    }
}

impl std::error::Error for MatchingError {}
