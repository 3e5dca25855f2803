//! Transaction errors.

use std::fmt;

use super::value_objects::TransactionStatus;
use crate::domain::position::PositionError;

/// Errors that can occur in the transaction lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// Invalid submission parameters.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Transition not allowed from the current status.
    InvalidStateTransition {
        /// Transaction ID.
        transaction_id: String,
        /// Current status.
        from: TransactionStatus,
        /// Attempted status.
        to: TransactionStatus,
        /// Reason for failure.
        reason: String,
    },

    /// The position ledger rejected the settlement or reversal.
    Ledger(PositionError),
}

impl TransactionError {
    /// Shorthand for [`TransactionError::InvalidParameters`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid transaction parameter '{field}': {message}")
            }
            Self::InvalidStateTransition {
                transaction_id,
                from,
                to,
                reason,
            } => {
                write!(
                    f,
                    "Invalid transition for transaction {transaction_id}: {from} -> {to}: {reason}"
                )
            }
            Self::Ledger(e) => write!(f, "Ledger rejected transaction: {e}"),
        }
    }
}

impl std::error::Error for TransactionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ledger(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PositionError> for TransactionError {
    fn from(e: PositionError) -> Self {
        Self::Ledger(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_display() {
        let err = TransactionError::InvalidStateTransition {
            transaction_id: "txn-1".to_string(),
            from: TransactionStatus::Completed,
            to: TransactionStatus::Completed,
            reason: "already completed".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("txn-1"));
        assert!(msg.contains("completed -> completed"));
    }

    #[test]
    fn ledger_error_has_source() {
        use std::error::Error;
        let err = TransactionError::from(PositionError::UnknownFund {
            fund: "fund-x".to_string(),
        });
        assert!(err.source().is_some());
    }
}
