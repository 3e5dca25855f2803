// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Fund Ledger - Rust Core Library
//!
//! Investor fund-transaction ledger with FIFO order matching.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, domain events)
//!   - `pricing`: Price-step rounding and tiered fees
//!   - `fund`: Fund aggregate and NAV view
//!   - `position`: Weighted-average-cost positions and the position ledger
//!   - `transaction`: Transaction aggregate and its pending → completed →
//!     cancelled lifecycle
//!   - `matching`: Matched pairs and the FIFO matcher
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Execution venue, NAV provider, account directory, events
//!   - `use_cases`: Submit, settle, match, dispatch, query, quote
//!   - `services`: Periodic matching scheduler
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: In-memory stores with optimistic concurrency
//!   - `gateway`: Paper and HTTP venues with timeout and retry
//!   - `config`: Dependency injection container
//!
//! Cross-cutting: `config` (YAML loading), `observability` (logging and
//! metrics), `error` (the `LedgerError` API boundary).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Error types at the ledger's API boundary.
pub mod error;

/// Logging and metrics.
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::fund::Fund;
pub use domain::matching::MatchedOrderPair;
pub use domain::position::{Position, PositionKey};
pub use domain::pricing::{FeeSchedule, round_price_to_step};
pub use domain::shared::{
    AccountId, FundId, InvestorId, Money, PairId, Timestamp, TransactionId, Units, VenueOrderId,
};
pub use domain::transaction::{
    ExchangeDestination, SubmitTransactionCommand, Transaction, TransactionStatus,
    TransactionType,
};

// Application re-exports
pub use application::ports::{
    AccountDirectoryPort, EventPublisherPort, ExecutionGatewayPort, NavProviderPort,
    NoOpEventPublisher,
};
pub use application::services::{MatchingSchedulerConfig, MatchingSchedulerService, TickSummary};
pub use application::use_cases::{
    DispatchOutcome, DispatchPairUseCase, MatchOrdersUseCase, QueryLedgerUseCase,
    QuotePriceUseCase, SettleTransactionUseCase, SubmitTransactionUseCase,
};

// Infrastructure re-exports
pub use infrastructure::config::{Container, LedgerContainer, build_container};

// Cross-cutting re-exports
pub use config::{Config, load_config};
pub use error::{ErrorCode, LedgerError};
