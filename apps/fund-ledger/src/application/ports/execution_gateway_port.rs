//! Execution Gateway Port (Driven Port)
//!
//! Interface to the external venue that executes the buy leg of a matched
//! pair.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{AccountId, Money, PairId, Units, VenueOrderId};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

/// Request to place an order at the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrderRequest {
    /// Stable client-generated reference; the venue de-duplicates on it.
    pub client_reference: PairId,
    /// Venue account.
    pub account: AccountId,
    /// Fund ticker as quoted by the venue.
    pub fund_symbol: String,
    /// Order side.
    pub side: OrderSide,
    /// Quantity.
    pub quantity: Units,
    /// Limit price; `None` for a market order.
    pub limit_price: Option<Money>,
}

impl GatewayOrderRequest {
    /// Create a market buy request.
    #[must_use]
    pub const fn market_buy(
        client_reference: PairId,
        account: AccountId,
        fund_symbol: String,
        quantity: Units,
    ) -> Self {
        Self {
            client_reference,
            account,
            fund_symbol,
            side: OrderSide::Buy,
            quantity,
            limit_price: None,
        }
    }

    /// Returns true for market orders.
    #[must_use]
    pub const fn is_market(&self) -> bool {
        self.limit_price.is_none()
    }
}

/// Venue response to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GatewayAck {
    /// Order accepted.
    Accepted {
        /// Venue-assigned order ID.
        venue_order_id: VenueOrderId,
    },
    /// Order rejected by the venue.
    Rejected {
        /// Rejection reason.
        reason: String,
    },
}

/// Execution gateway error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Venue could not be reached.
    #[error("Execution venue unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Call did not complete in time; outcome unknown.
    #[error("Execution venue call timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout applied.
        timeout_ms: u64,
    },

    /// Venue is throttling requests.
    #[error("Rate limited by execution venue")]
    RateLimited,

    /// Venue answered with something we could not interpret.
    #[error("Invalid venue response: {message}")]
    InvalidResponse {
        /// Error details.
        message: String,
    },

    /// Venue refused the request outright (authentication, bad payload).
    #[error("Execution venue refused request: {message}")]
    Refused {
        /// Error details.
        message: String,
    },
}

impl GatewayError {
    /// Returns true if another attempt may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Timeout { .. } | Self::RateLimited
        )
    }
}

/// Port for the execution venue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionGatewayPort: Send + Sync {
    /// Place an order.
    async fn submit_order(&self, request: GatewayOrderRequest) -> Result<GatewayAck, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn market_buy_request() {
        let request = GatewayOrderRequest::market_buy(
            PairId::new("pair-1"),
            AccountId::new("acct-1"),
            "FNDA".to_string(),
            Units::new(dec!(60)),
        );
        assert!(request.is_market());
        assert_eq!(request.side, OrderSide::Buy);
    }

    #[test]
    fn transient_errors() {
        assert!(GatewayError::Timeout { timeout_ms: 10 }.is_transient());
        assert!(GatewayError::RateLimited.is_transient());
        assert!(
            GatewayError::Unavailable {
                message: "down".to_string()
            }
            .is_transient()
        );
        assert!(
            !GatewayError::Refused {
                message: "401".to_string()
            }
            .is_transient()
        );
    }

    #[test]
    fn ack_serde_is_tagged() {
        let ack = GatewayAck::Accepted {
            venue_order_id: VenueOrderId::new("v-1"),
        };
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["status"], "accepted");
        assert_eq!(json["venue_order_id"], "v-1");
    }

    #[tokio::test]
    async fn mock_gateway_is_usable() {
        let mut mock = MockExecutionGatewayPort::new();
        mock.expect_submit_order().returning(|_| {
            Ok(GatewayAck::Rejected {
                reason: "closed".to_string(),
            })
        });
        let ack = mock
            .submit_order(GatewayOrderRequest::market_buy(
                PairId::new("p"),
                AccountId::new("a"),
                "F".to_string(),
                Units::from_i64(1),
            ))
            .await
            .unwrap();
        assert!(matches!(ack, GatewayAck::Rejected { .. }));
    }
}
