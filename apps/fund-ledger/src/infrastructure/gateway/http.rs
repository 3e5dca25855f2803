//! HTTP execution venue adapter.
//!
//! `POST {base_url}/orders` with a bearer API key. The venue de-duplicates on
//! `client_order_id`, which is the pair ID, so replays return the original
//! order. This adapter makes exactly one call; retry and timeout policy
//! belong to [`super::ResilientGateway`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::retry::is_retryable_status;
use crate::application::ports::{
    ExecutionGatewayPort, GatewayAck, GatewayError, GatewayOrderRequest, OrderSide,
};
use crate::domain::shared::VenueOrderId;

/// Order body sent to the venue.
#[derive(Debug, Serialize)]
struct VenueOrderBody<'a> {
    client_order_id: &'a str,
    account_id: &'a str,
    symbol: &'a str,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: &'static str,
    #[serde(with = "rust_decimal::serde::str")]
    qty: rust_decimal::Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    limit_price: Option<rust_decimal::Decimal>,
}

impl<'a> From<&'a GatewayOrderRequest> for VenueOrderBody<'a> {
    fn from(request: &'a GatewayOrderRequest) -> Self {
        Self {
            client_order_id: request.client_reference.as_str(),
            account_id: request.account.as_str(),
            symbol: &request.fund_symbol,
            side: request.side,
            order_type: if request.is_market() { "market" } else { "limit" },
            qty: request.quantity.amount(),
            limit_price: request.limit_price.map(|p| p.amount()),
        }
    }
}

/// Venue order response.
#[derive(Debug, Deserialize)]
struct VenueOrderResponse {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reject_reason: Option<String>,
}

/// Venue error body.
#[derive(Debug, Deserialize)]
struct VenueErrorResponse {
    #[serde(default)]
    message: String,
}

/// Execution gateway over the venue's REST API.
#[derive(Debug, Clone)]
pub struct HttpExecutionGateway {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_ms: u64,
}

impl HttpExecutionGateway {
    /// Create a client for `base_url`. `timeout` bounds each HTTP call.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Refused` if the base URL is empty or the HTTP
    /// client cannot be built.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(GatewayError::Refused {
                message: "venue base URL is not configured".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Refused {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    fn classify_send_error(&self, e: &reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            GatewayError::Unavailable {
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ExecutionGatewayPort for HttpExecutionGateway {
    async fn submit_order(&self, request: GatewayOrderRequest) -> Result<GatewayAck, GatewayError> {
        let url = format!("{}/orders", self.base_url);
        let body = VenueOrderBody::from(&request);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_send_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.classify_send_error(&e))?;

        if status.is_success() {
            let order: VenueOrderResponse =
                serde_json::from_str(&text).map_err(|e| GatewayError::InvalidResponse {
                    message: e.to_string(),
                })?;
            if order.status.as_deref() == Some("rejected") {
                return Ok(GatewayAck::Rejected {
                    reason: order
                        .reject_reason
                        .unwrap_or_else(|| "rejected by venue".to_string()),
                });
            }
            return Ok(GatewayAck::Accepted {
                venue_order_id: VenueOrderId::new(order.id),
            });
        }

        let message = serde_json::from_str::<VenueErrorResponse>(&text)
            .map(|e| e.message)
            .unwrap_or(text);

        match status {
            StatusCode::UNPROCESSABLE_ENTITY => Ok(GatewayAck::Rejected { reason: message }),
            StatusCode::TOO_MANY_REQUESTS => Err(GatewayError::RateLimited),
            s if is_retryable_status(s.as_u16()) => Err(GatewayError::Unavailable {
                message: format!("{}: {message}", s.as_u16()),
            }),
            s => Err(GatewayError::Refused {
                message: format!("{}: {message}", s.as_u16()),
            }),
        }
    }
}
