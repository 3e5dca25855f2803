//! NAV provider backed by the NAVs published into this process.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::application::ports::{NavError, NavProviderPort};
use crate::domain::fund::Fund;
use crate::domain::shared::{FundId, Money};

/// Latest NAV per fund, held in memory.
#[derive(Debug, Default)]
pub struct StaticNavProvider {
    navs: RwLock<HashMap<FundId, Money>>,
}

impl StaticNavProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the funds' current NAVs.
    #[must_use]
    pub fn from_funds<'a>(funds: impl IntoIterator<Item = &'a Fund>) -> Self {
        let navs = funds
            .into_iter()
            .map(|f| (f.id().clone(), f.current_nav()))
            .collect();
        Self {
            navs: RwLock::new(navs),
        }
    }

    /// Publish a NAV for a fund.
    pub fn publish(&self, fund: FundId, nav: Money) {
        self.navs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fund, nav);
    }
}

#[async_trait]
impl NavProviderPort for StaticNavProvider {
    async fn current_nav(&self, fund: &FundId) -> Result<Money, NavError> {
        self.navs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(fund)
            .copied()
            .ok_or_else(|| NavError::NotFound {
                fund: fund.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fund::NewFund;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn seeded_from_funds() {
        let fund = Fund::new(NewFund {
            id: FundId::new("fund-a"),
            ticker: "FNDA".to_string(),
            currency: "IDR".to_string(),
            current_nav: Money::new(dec!(1234.56)),
            previous_nav: None,
        })
        .unwrap();
        let provider = StaticNavProvider::from_funds([&fund]);

        let nav = provider.current_nav(&FundId::new("fund-a")).await.unwrap();
        assert_eq!(nav.amount(), dec!(1234.56));
    }

    #[tokio::test]
    async fn publish_overrides_and_unknown_is_not_found() {
        let provider = StaticNavProvider::new();
        provider.publish(FundId::new("fund-a"), Money::new(dec!(10)));
        provider.publish(FundId::new("fund-a"), Money::new(dec!(11)));

        let nav = provider.current_nav(&FundId::new("fund-a")).await.unwrap();
        assert_eq!(nav.amount(), dec!(11));
        assert!(matches!(
            provider.current_nav(&FundId::new("fund-b")).await,
            Err(NavError::NotFound { .. })
        ));
    }
}
