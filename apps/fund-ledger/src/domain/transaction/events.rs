//! Domain events for the transaction lifecycle.

use serde::{Deserialize, Serialize};

use super::value_objects::TransactionType;
use crate::domain::shared::{FundId, InvestorId, Money, Timestamp, TransactionId, Units};

/// All transaction events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionEvent {
    /// Transaction submitted as pending.
    Submitted(TransactionSubmitted),
    /// Transaction settled against the ledger.
    Completed(TransactionCompleted),
    /// Transaction cancelled.
    Cancelled(TransactionCancelled),
}

impl TransactionEvent {
    /// Get the transaction ID for this event.
    #[must_use]
    pub const fn transaction_id(&self) -> &TransactionId {
        match self {
            Self::Submitted(e) => &e.transaction_id,
            Self::Completed(e) => &e.transaction_id,
            Self::Cancelled(e) => &e.transaction_id,
        }
    }

    /// Get the timestamp when this event occurred.
    #[must_use]
    pub const fn occurred_at(&self) -> Timestamp {
        match self {
            Self::Submitted(e) => e.occurred_at,
            Self::Completed(e) => e.occurred_at,
            Self::Cancelled(e) => e.occurred_at,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Submitted(_) => "TRANSACTION_SUBMITTED",
            Self::Completed(_) => "TRANSACTION_COMPLETED",
            Self::Cancelled(_) => "TRANSACTION_CANCELLED",
        }
    }
}

/// Event: transaction submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSubmitted {
    /// Transaction ID.
    pub transaction_id: TransactionId,
    /// Investor.
    pub investor: InvestorId,
    /// Source fund.
    pub fund: FundId,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Units.
    pub units: Units,
    /// Recorded amount.
    pub amount: Money,
    /// Recorded fee.
    pub fee: Money,
    /// Event timestamp.
    pub occurred_at: Timestamp,
}

/// Event: transaction settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCompleted {
    /// Transaction ID.
    pub transaction_id: TransactionId,
    /// Investor.
    pub investor: InvestorId,
    /// Source fund.
    pub fund: FundId,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Units.
    pub units: Units,
    /// Event timestamp.
    pub occurred_at: Timestamp,
}

/// Event: transaction cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCancelled {
    /// Transaction ID.
    pub transaction_id: TransactionId,
    /// Investor.
    pub investor: InvestorId,
    /// Source fund.
    pub fund: FundId,
    /// True if a completed ledger effect was reversed.
    pub reversed: bool,
    /// Event timestamp.
    pub occurred_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_and_serde_tag() {
        let event = TransactionEvent::Cancelled(TransactionCancelled {
            transaction_id: TransactionId::new("txn-1"),
            investor: InvestorId::new("inv-1"),
            fund: FundId::new("fund-a"),
            reversed: true,
            occurred_at: Timestamp::now(),
        });
        assert_eq!(event.event_type(), "TRANSACTION_CANCELLED");
        assert_eq!(event.transaction_id().as_str(), "txn-1");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "CANCELLED");
    }
}
