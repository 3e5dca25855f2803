//! Transaction State Machine Service
//!
//! Validates lifecycle transitions.

use crate::domain::transaction::errors::TransactionError;
use crate::domain::transaction::value_objects::TransactionStatus;

/// Allowed transitions:
///
/// ```text
/// pending ──► completed ──► cancelled
///    └──────────────────────────┘
/// ```
pub struct TransactionStateMachine;

impl TransactionStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub const fn is_valid_transition(from: TransactionStatus, to: TransactionStatus) -> bool {
        matches!(
            (from, to),
            (TransactionStatus::Pending, TransactionStatus::Completed)
                | (TransactionStatus::Pending, TransactionStatus::Cancelled)
                | (TransactionStatus::Completed, TransactionStatus::Cancelled)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(
        transaction_id: &str,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Result<(), TransactionError> {
        if Self::is_valid_transition(from, to) {
            return Ok(());
        }
        Err(TransactionError::InvalidStateTransition {
            transaction_id: transaction_id.to_string(),
            from,
            to,
            reason: Self::transition_error_reason(from, to),
        })
    }

    /// Human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: TransactionStatus, to: TransactionStatus) -> String {
        if from.is_terminal() {
            return format!("Transaction is {from} and final, cannot transition to {to}");
        }
        match from {
            TransactionStatus::Completed => {
                format!("Transaction is already completed, cannot transition to {to}")
            }
            _ => format!("Invalid transition from {from} to {to}"),
        }
    }
}
