//! Dependency Injection Container
//!
//! Manages creation and wiring of all application components.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    AccountDirectoryPort, EventPublisherPort, ExecutionGatewayPort, NavProviderPort,
};
use crate::application::services::{MatchingSchedulerConfig, MatchingSchedulerService};
use crate::application::use_cases::{
    DispatchPairUseCase, MatchOrdersUseCase, QueryLedgerUseCase, QuotePriceUseCase,
    SettleTransactionUseCase, SubmitTransactionUseCase,
};
use crate::config::{Config, MatchingConfig};
use crate::domain::matching::MatchedPairRepository;
use crate::domain::pricing::FeeSchedule;
use crate::domain::transaction::LedgerRepository;
use crate::infrastructure::accounts::StaticAccountDirectory;
use crate::infrastructure::gateway::{ConfiguredGateway, ResilientGateway};
use crate::infrastructure::market_data::StaticNavProvider;
use crate::infrastructure::messaging::TracingEventPublisher;
use crate::infrastructure::persistence::{InMemoryLedgerRepository, InMemoryMatchedPairRepository};

/// Ledger settings shared by the use cases.
#[derive(Debug, Clone)]
pub struct LedgerSettings {
    /// Fee bands applied at submission.
    pub fees: FeeSchedule,
    /// Step used to round proposed prices.
    pub price_step: Decimal,
    /// Retries after an optimistic-concurrency conflict.
    pub max_conflict_retries: u32,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            price_step: crate::domain::pricing::DEFAULT_PRICE_STEP,
            max_conflict_retries: 3,
        }
    }
}

impl From<&MatchingConfig> for MatchingSchedulerConfig {
    fn from(config: &MatchingConfig) -> Self {
        Self {
            enabled: config.enabled,
            interval: Duration::from_millis(config.interval_ms),
            auto_dispatch: config.auto_dispatch,
            dispatch_batch_size: config.dispatch_batch_size,
        }
    }
}

/// Dependency injection container.
///
/// Holds the wired ports. The matching use case is a single shared instance
/// so that every caller goes through the same per-fund locks.
pub struct Container<L, P, G, A, N, E>
where
    L: LedgerRepository + 'static,
    P: MatchedPairRepository + 'static,
    G: ExecutionGatewayPort + 'static,
    A: AccountDirectoryPort + 'static,
    N: NavProviderPort + 'static,
    E: EventPublisherPort + 'static,
{
    // Ports
    ledger: Arc<L>,
    pairs: Arc<P>,
    gateway: Arc<G>,
    accounts: Arc<A>,
    nav_provider: Arc<N>,
    event_publisher: Arc<E>,

    settings: LedgerSettings,
    match_orders: Arc<MatchOrdersUseCase<L, P, E>>,
}

impl<L, P, G, A, N, E> Container<L, P, G, A, N, E>
where
    L: LedgerRepository + 'static,
    P: MatchedPairRepository + 'static,
    G: ExecutionGatewayPort + 'static,
    A: AccountDirectoryPort + 'static,
    N: NavProviderPort + 'static,
    E: EventPublisherPort + 'static,
{
    /// Create a new container with all dependencies.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: Arc<L>,
        pairs: Arc<P>,
        gateway: Arc<G>,
        accounts: Arc<A>,
        nav_provider: Arc<N>,
        event_publisher: Arc<E>,
        settings: LedgerSettings,
    ) -> Self {
        let match_orders = Arc::new(MatchOrdersUseCase::new(
            Arc::clone(&ledger),
            Arc::clone(&pairs),
            Arc::clone(&event_publisher),
        ));
        Self {
            ledger,
            pairs,
            gateway,
            accounts,
            nav_provider,
            event_publisher,
            settings,
            match_orders,
        }
    }

    /// Get the ledger repository.
    pub fn ledger(&self) -> Arc<L> {
        Arc::clone(&self.ledger)
    }

    /// Get the matched pair repository.
    pub fn pairs(&self) -> Arc<P> {
        Arc::clone(&self.pairs)
    }

    /// Get the execution gateway.
    pub fn gateway(&self) -> Arc<G> {
        Arc::clone(&self.gateway)
    }

    /// Get the account directory.
    pub fn accounts(&self) -> Arc<A> {
        Arc::clone(&self.accounts)
    }

    /// Get the NAV provider.
    pub fn nav_provider(&self) -> Arc<N> {
        Arc::clone(&self.nav_provider)
    }

    /// Create a `SubmitTransactionUseCase`.
    pub fn submit_transaction_use_case(&self) -> SubmitTransactionUseCase<L, E> {
        SubmitTransactionUseCase::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.event_publisher),
            self.settings.fees.clone(),
        )
    }

    /// Create a `SettleTransactionUseCase`.
    pub fn settle_transaction_use_case(&self) -> SettleTransactionUseCase<L, E> {
        SettleTransactionUseCase::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.event_publisher),
            self.settings.max_conflict_retries,
        )
    }

    /// The shared `MatchOrdersUseCase`.
    pub fn match_orders_use_case(&self) -> Arc<MatchOrdersUseCase<L, P, E>> {
        Arc::clone(&self.match_orders)
    }

    /// Create a `DispatchPairUseCase`.
    pub fn dispatch_pair_use_case(&self) -> DispatchPairUseCase<L, P, G, A, E> {
        DispatchPairUseCase::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.pairs),
            Arc::clone(&self.gateway),
            Arc::clone(&self.accounts),
            Arc::clone(&self.event_publisher),
        )
    }

    /// Create a `QueryLedgerUseCase`.
    pub fn query_use_case(&self) -> QueryLedgerUseCase<L, P> {
        QueryLedgerUseCase::new(Arc::clone(&self.ledger), Arc::clone(&self.pairs))
    }

    /// Create a `QuotePriceUseCase`.
    pub fn quote_price_use_case(&self) -> QuotePriceUseCase<N> {
        QuotePriceUseCase::new(Arc::clone(&self.nav_provider), self.settings.price_step)
    }

    /// Create the matching scheduler.
    pub fn matching_scheduler(
        &self,
        config: MatchingSchedulerConfig,
        shutdown: CancellationToken,
    ) -> MatchingSchedulerService<L, P, G, A, E> {
        MatchingSchedulerService::new(
            config,
            self.match_orders_use_case(),
            Arc::new(self.dispatch_pair_use_case()),
            shutdown,
        )
    }
}

/// Container wired with the in-process adapters and the configured venue.
pub type LedgerContainer = Container<
    InMemoryLedgerRepository,
    InMemoryMatchedPairRepository,
    ResilientGateway<ConfiguredGateway>,
    StaticAccountDirectory,
    StaticNavProvider,
    TracingEventPublisher,
>;

/// Build the container from a validated config, seeding funds and accounts.
///
/// # Errors
///
/// Returns error if a fund seed or the fee schedule is invalid, the gateway
/// cannot be built, or seeding the store fails.
pub async fn build_container(config: &Config) -> anyhow::Result<LedgerContainer> {
    // 1. Funds
    let funds = config
        .funds
        .iter()
        .map(|seed| {
            seed.to_fund()
                .with_context(|| format!("invalid fund seed {}", seed.id))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let ledger = Arc::new(InMemoryLedgerRepository::new());
    for fund in &funds {
        ledger
            .upsert_fund(fund)
            .await
            .with_context(|| format!("failed to register fund {}", fund.id()))?;
    }

    // 2. Collaborators
    let nav_provider = Arc::new(StaticNavProvider::from_funds(&funds));
    let accounts = Arc::new(StaticAccountDirectory::from_pairs(
        config
            .accounts
            .iter()
            .map(|(investor, account)| (investor.as_str(), account.as_str())),
    ));
    let gateway = Arc::new(
        ConfiguredGateway::from_config(&config.gateway)
            .context("failed to build execution gateway")?,
    );

    // 3. Settings
    let settings = LedgerSettings {
        fees: config
            .pricing
            .fee_schedule()
            .context("invalid fee schedule")?,
        price_step: config.pricing.price_step,
        max_conflict_retries: config.ledger.max_conflict_retries,
    };

    tracing::info!(
        funds = funds.len(),
        accounts = accounts.len(),
        gateway = config.gateway.mode.as_str(),
        "Container wired"
    );

    Ok(Container::new(
        ledger,
        Arc::new(InMemoryMatchedPairRepository::new()),
        gateway,
        accounts,
        nav_provider,
        Arc::new(TracingEventPublisher::new()),
        settings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_string;
    use crate::domain::shared::{AccountId, FundId, InvestorId};
    use rust_decimal_macros::dec;

    const YAML: &str = r"
funds:
  - id: fund-a
    ticker: FNDA
    current_nav: 1024
accounts:
  inv-1: acct-1
";

    #[tokio::test]
    async fn build_seeds_funds_and_accounts() {
        let config = load_config_from_string(YAML).unwrap();

        let container = build_container(&config).await.unwrap();

        let fund = container
            .ledger()
            .find_fund(&FundId::new("fund-a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fund.value.ticker(), "FNDA");
        assert_eq!(
            container
                .accounts()
                .resolve_account(&InvestorId::new("inv-1"))
                .await
                .unwrap(),
            Some(AccountId::new("acct-1"))
        );
        let price = container
            .quote_price_use_case()
            .propose_price(&FundId::new("fund-a"))
            .await
            .unwrap();
        assert_eq!(price.amount(), dec!(1000));
    }

    #[tokio::test]
    async fn match_orders_instance_is_shared() {
        let container = build_container(&Config::default()).await.unwrap();

        assert!(Arc::ptr_eq(
            &container.match_orders_use_case(),
            &container.match_orders_use_case()
        ));
    }

    #[test]
    fn scheduler_config_from_matching_config() {
        let config = MatchingSchedulerConfig::from(&MatchingConfig {
            interval_ms: 250,
            auto_dispatch: true,
            ..MatchingConfig::default()
        });
        assert_eq!(config.interval, Duration::from_millis(250));
        assert!(config.auto_dispatch);
    }
}
