//! Transaction status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable status of a transaction, derived from its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Submitted, no ledger effect yet.
    Pending,
    /// Settled; ledger effect applied.
    Completed,
    /// Cancelled; any ledger effect reversed.
    Cancelled,
}

impl TransactionStatus {
    /// Returns true if no further forward transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}
