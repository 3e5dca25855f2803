//! Transaction state with its ledger payload.

use serde::{Deserialize, Serialize};

use super::TransactionStatus;
use crate::domain::position::LedgerEffect;
use crate::domain::shared::Timestamp;

/// Closed set of transaction states.
///
/// The recorded ledger effect travels with the state that owns it, so a
/// completed transaction always knows exactly what to reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionState {
    /// Awaiting settlement.
    Pending,
    /// Settled with the given effect.
    Completed {
        /// Deltas applied on completion.
        effect: LedgerEffect,
        /// Completion time.
        completed_at: Timestamp,
    },
    /// Cancelled, with the reversal applied if the transaction had settled.
    Cancelled {
        /// Deltas applied on cancellation; `None` when cancelled from pending.
        reversal: Option<LedgerEffect>,
        /// Cancellation time.
        cancelled_at: Timestamp,
    },
}

impl TransactionState {
    /// Status derived from the state.
    #[must_use]
    pub const fn status(&self) -> TransactionStatus {
        match self {
            Self::Pending => TransactionStatus::Pending,
            Self::Completed { .. } => TransactionStatus::Completed,
            Self::Cancelled { .. } => TransactionStatus::Cancelled,
        }
    }

    /// The applied effect, if completed.
    #[must_use]
    pub const fn effect(&self) -> Option<&LedgerEffect> {
        match self {
            Self::Completed { effect, .. } => Some(effect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_derived() {
        assert_eq!(TransactionState::Pending.status(), TransactionStatus::Pending);
        let completed = TransactionState::Completed {
            effect: LedgerEffect::default(),
            completed_at: Timestamp::now(),
        };
        assert_eq!(completed.status(), TransactionStatus::Completed);
        assert!(completed.effect().is_some());

        let cancelled = TransactionState::Cancelled {
            reversal: None,
            cancelled_at: Timestamp::now(),
        };
        assert_eq!(cancelled.status(), TransactionStatus::Cancelled);
        assert!(cancelled.effect().is_none());
    }

    #[test]
    fn serde_is_tagged() {
        let json = serde_json::to_value(TransactionState::Pending).unwrap();
        assert_eq!(json["status"], "pending");
    }
}
