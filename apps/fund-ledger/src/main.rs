//! Fund Ledger Binary
//!
//! Starts the matching scheduler over an in-process ledger.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin fund-ledger
//! ```
//!
//! # Environment Variables
//!
//! - `FUND_LEDGER_CONFIG`: Path to the YAML config (default: config.yaml)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`
//! - Any `${VAR}` referenced from the config file

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use fund_ledger::application::services::{MatchingSchedulerConfig, SchedulerError};
use fund_ledger::config::{Config, DEFAULT_CONFIG_PATH, load_config};
use fund_ledger::infrastructure::config::build_container;
use fund_ledger::observability::{init_logging, init_metrics};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable naming the config file.
const CONFIG_PATH_ENV: &str = "FUND_LEDGER_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let (config, config_path, found) = read_config()?;
    init_logging(&config.observability.logging).context("failed to initialize logging")?;

    tracing::info!(
        config_path = %config_path,
        config_found = found,
        version = env!("CARGO_PKG_VERSION"),
        "Starting Fund Ledger"
    );
    if !found {
        tracing::warn!(config_path = %config_path, "Config file not found, using defaults");
    }

    if config.observability.metrics.enabled {
        let addr: SocketAddr = config
            .observability
            .metrics
            .listen_address
            .parse()
            .context("invalid metrics listen address")?;
        init_metrics(addr).context("failed to start metrics exporter")?;
        tracing::info!(address = %addr, "Prometheus exporter listening");
    }

    let container = build_container(&config).await?;
    let shutdown_token = CancellationToken::new();

    let scheduler = Arc::new(container.matching_scheduler(
        MatchingSchedulerConfig::from(&config.matching),
        shutdown_token.clone(),
    ));
    let scheduler_handle = match scheduler.start() {
        Ok(handle) => Some(handle),
        Err(SchedulerError::NotEnabled) => {
            tracing::info!("Matching scheduler disabled");
            None
        }
    };

    await_shutdown(shutdown_token).await;

    if let Some(handle) = scheduler_handle {
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await.is_err() {
            tracing::warn!(
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "Matching scheduler did not stop in time"
            );
        }
    }

    tracing::info!("Fund Ledger stopped");
    Ok(())
}

/// Read the config file, falling back to defaults when it does not exist.
fn read_config() -> anyhow::Result<(Config, String, bool)> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        return Ok((Config::default(), path, false));
    }
    let config =
        load_config(Some(&path)).with_context(|| format!("failed to load config from {path}"))?;
    Ok((config, path, true))
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT), then cancel background tasks.
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
