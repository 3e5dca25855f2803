//! Account directory backed by a fixed map, seeded from configuration.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::application::ports::{AccountDirectoryError, AccountDirectoryPort};
use crate::domain::shared::{AccountId, InvestorId};

/// In-process investor → venue account map.
#[derive(Debug, Default)]
pub struct StaticAccountDirectory {
    accounts: RwLock<HashMap<InvestorId, AccountId>>,
}

impl StaticAccountDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(investor, account)` string pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let accounts = pairs
            .into_iter()
            .map(|(k, v)| (InvestorId::new(k), AccountId::new(v)))
            .collect();
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    /// Map an investor to an account, replacing any previous mapping.
    pub fn insert(&self, investor: InvestorId, account: AccountId) {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(investor, account);
    }

    /// Number of mapped investors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no investor is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AccountDirectoryPort for StaticAccountDirectory {
    async fn resolve_account(
        &self,
        investor: &InvestorId,
    ) -> Result<Option<AccountId>, AccountDirectoryError> {
        Ok(self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(investor)
            .cloned())
    }
}
