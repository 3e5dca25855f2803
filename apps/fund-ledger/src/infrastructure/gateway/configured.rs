//! Gateway selected by configuration.

use std::time::Duration;

use async_trait::async_trait;

use super::{HttpExecutionGateway, PaperExecutionGateway, ResilientGateway, RetryPolicy};
use crate::application::ports::{
    ExecutionGatewayPort, GatewayAck, GatewayError, GatewayOrderRequest,
};
use crate::config::{GatewayConfig, GatewayMode};

/// The venue adapter chosen by `gateway.mode`.
#[derive(Debug)]
pub enum ConfiguredGateway {
    /// In-process paper venue.
    Paper(PaperExecutionGateway),
    /// Remote REST venue.
    Http(HttpExecutionGateway),
}

impl ConfiguredGateway {
    /// Build the configured adapter wrapped with timeout and retry.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig) -> Result<ResilientGateway<Self>, GatewayError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let gateway = match config.mode {
            GatewayMode::Paper => Self::Paper(PaperExecutionGateway::new()),
            GatewayMode::Http => Self::Http(HttpExecutionGateway::new(
                &config.base_url,
                &config.api_key,
                timeout,
            )?),
        };
        Ok(ResilientGateway::new(
            gateway,
            config.mode.as_str(),
            timeout,
            RetryPolicy::from(&config.retry),
        ))
    }
}

#[async_trait]
impl ExecutionGatewayPort for ConfiguredGateway {
    async fn submit_order(&self, request: GatewayOrderRequest) -> Result<GatewayAck, GatewayError> {
        match self {
            Self::Paper(g) => g.submit_order(request).await,
            Self::Http(g) => g.submit_order(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_mode_by_default() {
        let gateway = ConfiguredGateway::from_config(&GatewayConfig::default()).unwrap();
        assert!(matches!(gateway.inner(), ConfiguredGateway::Paper(_)));
    }

    #[test]
    fn http_mode_builds_client() {
        let config = GatewayConfig {
            mode: GatewayMode::Http,
            base_url: "http://venue.local".to_string(),
            ..GatewayConfig::default()
        };
        let gateway = ConfiguredGateway::from_config(&config).unwrap();
        assert!(matches!(gateway.inner(), ConfiguredGateway::Http(_)));
    }
}
