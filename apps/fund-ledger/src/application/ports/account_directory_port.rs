//! Account Directory Port (Driven Port)
//!
//! Resolves the venue account an investor's orders are placed under.

use async_trait::async_trait;

use crate::domain::shared::{AccountId, InvestorId};

/// Account directory error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountDirectoryError {
    /// Directory could not be reached.
    #[error("Account directory unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Port for investor → venue account resolution.
#[async_trait]
pub trait AccountDirectoryPort: Send + Sync {
    /// Account for an investor, or `None` if no mapping exists.
    async fn resolve_account(
        &self,
        investor: &InvestorId,
    ) -> Result<Option<AccountId>, AccountDirectoryError>;
}
