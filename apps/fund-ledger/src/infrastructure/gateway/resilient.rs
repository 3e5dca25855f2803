//! Timeout and retry around any execution gateway.
//!
//! Every attempt is bounded by a timeout. Transient failures (unreachable,
//! timed out, rate limited) are retried with backoff; a venue rejection or a
//! refused request is returned at once. Retrying is safe because every
//! attempt carries the same client reference.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::retry::{ExponentialBackoff, RetryPolicy};
use crate::application::ports::{
    ExecutionGatewayPort, GatewayAck, GatewayError, GatewayOrderRequest,
};
use crate::observability::record_gateway_attempt;

/// Gateway decorator adding per-attempt timeout and retry.
#[derive(Debug)]
pub struct ResilientGateway<G> {
    inner: G,
    name: &'static str,
    timeout: Duration,
    policy: RetryPolicy,
}

impl<G: ExecutionGatewayPort> ResilientGateway<G> {
    /// Wrap `inner`. `name` labels the attempt metrics.
    #[must_use]
    pub const fn new(inner: G, name: &'static str, timeout: Duration, policy: RetryPolicy) -> Self {
        Self {
            inner,
            name,
            timeout,
            policy,
        }
    }

    /// The wrapped gateway.
    #[must_use]
    pub const fn inner(&self) -> &G {
        &self.inner
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn attempt(&self, request: GatewayOrderRequest) -> Result<GatewayAck, GatewayError> {
        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.inner.submit_order(request))
            .await
            .unwrap_or(Err(GatewayError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }));

        let status = match &result {
            Ok(GatewayAck::Accepted { .. }) => "accepted",
            Ok(GatewayAck::Rejected { .. }) => "rejected",
            Err(GatewayError::Timeout { .. }) => "timeout",
            Err(GatewayError::RateLimited) => "rate_limited",
            Err(GatewayError::Unavailable { .. }) => "unavailable",
            Err(_) => "error",
        };
        record_gateway_attempt(self.name, status, started.elapsed().as_secs_f64());
        result
    }
}

#[async_trait]
impl<G: ExecutionGatewayPort> ExecutionGatewayPort for ResilientGateway<G> {
    async fn submit_order(&self, request: GatewayOrderRequest) -> Result<GatewayAck, GatewayError> {
        let mut backoff = ExponentialBackoff::new(&self.policy);

        loop {
            match self.attempt(request.clone()).await {
                Err(e) if e.is_transient() => {
                    let Some(delay) = backoff.next_backoff() else {
                        tracing::warn!(
                            gateway = self.name,
                            client_reference = %request.client_reference,
                            attempts = backoff.attempts(),
                            "Venue retries exhausted: {}",
                            e
                        );
                        return Err(e);
                    };
                    tracing::warn!(
                        gateway = self.name,
                        client_reference = %request.client_reference,
                        delay_ms = delay.as_millis(),
                        attempt = backoff.attempts() - 1,
                        "Transient venue error, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}
