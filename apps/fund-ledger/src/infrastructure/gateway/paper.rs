//! In-process paper venue.
//!
//! Accepts every order unless told otherwise. Replaying a client reference
//! returns the venue order ID assigned the first time, the same way a real
//! venue de-duplicates. Rejections and transient outages can be scripted for
//! drills and tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::application::ports::{
    ExecutionGatewayPort, GatewayAck, GatewayError, GatewayOrderRequest,
};
use crate::domain::shared::{PairId, VenueOrderId};

/// Paper execution venue.
#[derive(Debug, Default)]
pub struct PaperExecutionGateway {
    orders: RwLock<HashMap<PairId, VenueOrderId>>,
    rejected_symbols: RwLock<HashSet<String>>,
    failures_remaining: AtomicU32,
}

impl PaperExecutionGateway {
    /// Create a venue that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every future order for `symbol`.
    pub fn reject_symbol(&self, symbol: impl Into<String>) {
        self.rejected_symbols
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.into());
    }

    /// Fail the next `count` calls as unavailable.
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Number of distinct orders accepted.
    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn take_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ExecutionGatewayPort for PaperExecutionGateway {
    async fn submit_order(&self, request: GatewayOrderRequest) -> Result<GatewayAck, GatewayError> {
        if self.take_failure() {
            return Err(GatewayError::Unavailable {
                message: "paper venue outage".to_string(),
            });
        }

        if self
            .rejected_symbols
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&request.fund_symbol)
        {
            return Ok(GatewayAck::Rejected {
                reason: format!("{} is not tradable", request.fund_symbol),
            });
        }

        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let venue_order_id = orders
            .entry(request.client_reference.clone())
            .or_insert_with(|| VenueOrderId::new(format!("paper-{}", uuid::Uuid::new_v4())))
            .clone();

        tracing::debug!(
            client_reference = %request.client_reference,
            venue_order_id = %venue_order_id,
            symbol = %request.fund_symbol,
            quantity = %request.quantity,
            "Paper order accepted"
        );
        Ok(GatewayAck::Accepted { venue_order_id })
    }
}
