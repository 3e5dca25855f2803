//! NAV Provider Port (Driven Port)
//!
//! The market-data collaborator's view of the latest NAV per fund. Used only
//! to propose prices; settlement always uses a transaction's own recorded
//! price.

use async_trait::async_trait;

use crate::domain::shared::{FundId, Money};

/// NAV provider error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// No NAV published for the fund.
    #[error("No NAV published for fund {fund}")]
    NotFound {
        /// Fund ID.
        fund: String,
    },

    /// Provider could not be reached.
    #[error("NAV provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Port for current NAV lookups.
#[async_trait]
pub trait NavProviderPort: Send + Sync {
    /// Latest NAV for a fund.
    async fn current_nav(&self, fund: &FundId) -> Result<Money, NavError>;
}
