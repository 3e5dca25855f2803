//! Matching Scheduler Service
//!
//! Runs a matching cycle on a fixed period and, when auto-dispatch is on,
//! forwards unsent buy legs to the execution venue: the tick's new pairs
//! first, then older pairs still waiting. Pairs that failed for good are
//! parked and skipped. A failed tick is logged and the next tick runs as
//! scheduled.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{AccountDirectoryPort, EventPublisherPort, ExecutionGatewayPort};
use crate::application::use_cases::{DispatchOutcome, DispatchPairUseCase, MatchOrdersUseCase};
use crate::domain::matching::MatchedPairRepository;
use crate::domain::shared::PairId;
use crate::domain::transaction::LedgerRepository;
use crate::error::LedgerError;

/// Configuration for the matching scheduler.
#[derive(Debug, Clone)]
pub struct MatchingSchedulerConfig {
    /// Whether the periodic loop runs.
    pub enabled: bool,
    /// Period between ticks.
    pub interval: Duration,
    /// Dispatch unsent pairs after matching.
    pub auto_dispatch: bool,
    /// Maximum pairs dispatched per tick.
    pub dispatch_batch_size: usize,
}

impl Default for MatchingSchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(1),
            auto_dispatch: false,
            dispatch_batch_size: 50,
        }
    }
}

/// Summary of one scheduler tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Pairs created by the matching cycle.
    pub pairs_created: usize,
    /// Pairs accepted by the venue.
    pub dispatched: usize,
    /// Pairs rejected by the venue or failed with an error.
    pub dispatch_failures: usize,
}

/// Scheduler errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler is disabled by configuration.
    #[error("matching scheduler is not enabled")]
    NotEnabled,
}

/// Periodic matching and dispatch.
pub struct MatchingSchedulerService<L, P, G, A, E>
where
    L: LedgerRepository + 'static,
    P: MatchedPairRepository + 'static,
    G: ExecutionGatewayPort + 'static,
    A: AccountDirectoryPort + 'static,
    E: EventPublisherPort + 'static,
{
    config: MatchingSchedulerConfig,
    match_orders: Arc<MatchOrdersUseCase<L, P, E>>,
    dispatch: Arc<DispatchPairUseCase<L, P, G, A, E>>,
    shutdown: CancellationToken,
}

impl<L, P, G, A, E> MatchingSchedulerService<L, P, G, A, E>
where
    L: LedgerRepository + 'static,
    P: MatchedPairRepository + 'static,
    G: ExecutionGatewayPort + 'static,
    A: AccountDirectoryPort + 'static,
    E: EventPublisherPort + 'static,
{
    /// Create a new scheduler.
    #[must_use]
    pub const fn new(
        config: MatchingSchedulerConfig,
        match_orders: Arc<MatchOrdersUseCase<L, P, E>>,
        dispatch: Arc<DispatchPairUseCase<L, P, G, A, E>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            match_orders,
            dispatch,
            shutdown,
        }
    }

    /// Run one matching cycle, then dispatch if configured.
    ///
    /// # Errors
    ///
    /// Returns error if the matching cycle or the unsent-pair listing fails.
    /// Per-pair dispatch failures are counted, not returned.
    pub async fn tick(&self) -> Result<TickSummary, LedgerError> {
        let created = self.match_orders.run_matching_cycle(None).await?;
        let mut summary = TickSummary {
            pairs_created: created.len(),
            ..TickSummary::default()
        };

        if !self.config.auto_dispatch {
            return Ok(summary);
        }

        let new_pairs: Vec<PairId> = created.iter().map(|p| p.id().clone()).collect();
        let reports = self
            .dispatch
            .dispatch_new_then_backlog(&new_pairs, self.config.dispatch_batch_size)
            .await?;
        for report in reports {
            match report.result {
                Ok(DispatchOutcome::Sent { .. }) => summary.dispatched += 1,
                Ok(DispatchOutcome::AlreadySent) => {}
                Ok(DispatchOutcome::Failed { .. }) | Err(_) => {
                    summary.dispatch_failures += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Spawn the periodic loop. It stops when the shutdown token is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::NotEnabled` if the scheduler is disabled.
    pub fn start(self: Arc<Self>) -> Result<JoinHandle<()>, SchedulerError> {
        if !self.config.enabled {
            return Err(SchedulerError::NotEnabled);
        }

        tracing::info!(
            interval_ms = self.config.interval.as_millis(),
            auto_dispatch = self.config.auto_dispatch,
            "Starting matching scheduler"
        );

        Ok(tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match self.tick().await {
                            Ok(summary) if summary.pairs_created > 0 || summary.dispatched > 0 => {
                                tracing::info!(
                                    pairs_created = summary.pairs_created,
                                    dispatched = summary.dispatched,
                                    dispatch_failures = summary.dispatch_failures,
                                    "Matching tick finished"
                                );
                            }
                            Ok(_) => {}
                            Err(e) => {
                                tracing::error!(code = %e.code(), "Matching tick failed: {}", e);
                            }
                        }
                    }
                    () = self.shutdown.cancelled() => {
                        tracing::info!("Matching scheduler shutting down");
                        break;
                    }
                }
            }
        }))
    }
}
