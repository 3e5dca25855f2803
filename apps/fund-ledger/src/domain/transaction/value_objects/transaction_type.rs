//! Transaction type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of fund transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Buy units of a fund.
    Purchase,
    /// Sell units of a fund.
    Sell,
    /// Sell units of one fund and buy units of another.
    Exchange,
}

impl TransactionType {
    /// Returns true for types the matcher pairs against each other.
    #[must_use]
    pub const fn is_matchable(&self) -> bool {
        matches!(self, Self::Purchase | Self::Sell)
    }

    /// Returns true if the type needs an exchange destination.
    #[must_use]
    pub const fn requires_destination(&self) -> bool {
        matches!(self, Self::Exchange)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Purchase => "purchase",
            Self::Sell => "sell",
            Self::Exchange => "exchange",
        };
        write!(f, "{s}")
    }
}
