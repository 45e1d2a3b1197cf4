//! # Order Forwarding
//!
//! [`OrderForwardingJob`] is the cycle processor. On every firing it:
//!
//! 1. takes the fresh [`CycleScope`] prepared for this cycle,
//! 2. fetches up to `batch_size` authorized orders,
//! 3. ends quietly if there are none,
//! 4. otherwise builds one [`OrderAuthorizedEvent`] per order and publishes it, in fetch order,
//! 5. logs each order once the bus has accepted its event.
//!
//! Steps run strictly in sequence. The first publish failure ends the cycle: the failed order
//! and every order after it are handed back through
//! [`OrderQueries::requeue`](crate::clients::OrderQueries::requeue) so a later cycle offers
//! them again. Nothing is retried within the cycle.

use crate::clients::order_ids;
use crate::error::OrchestratorError;
use crate::model::AuthorizedOrder;
use crate::events::{IntegrationEvent, OrderAuthorizedEvent};
use crate::scope::{CycleScope, ScopeFactory};
use async_trait::async_trait;
use hosted_service::CycleJob;
use tracing::{debug, error, info, warn};

/// What one cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub forwarded: usize,
}

pub struct OrderForwardingJob<F: ScopeFactory> {
    scopes: F,
    batch_size: usize,
}

impl<F: ScopeFactory> OrderForwardingJob<F> {
    /// `batch_size` is clamped to at least 1.
    pub fn new(scopes: F, batch_size: usize) -> Self {
        Self {
            scopes,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Runs a single cycle outside any trigger, with errors returned instead of contained.
    pub async fn run_once(&self) -> Result<CycleReport, OrchestratorError> {
        let scope = self.begin_scope()?;
        self.run_cycle(scope, 0).await
    }
}

#[async_trait]
impl<F: ScopeFactory> CycleJob for OrderForwardingJob<F> {
    type Scope = CycleScope;
    type Output = CycleReport;
    type Error = OrchestratorError;

    fn name(&self) -> &'static str {
        "OrderForwardingJob"
    }

    fn begin_scope(&self) -> Result<CycleScope, OrchestratorError> {
        self.scopes.create_scope()
    }

    async fn run_cycle(
        &self,
        scope: CycleScope,
        _cycle: u64,
    ) -> Result<CycleReport, OrchestratorError> {
        let orders = scope.queries.fetch_authorized(self.batch_size).await?;
        if orders.is_empty() {
            debug!("No authorized orders");
            return Ok(CycleReport::default());
        }

        let mut report = CycleReport {
            fetched: orders.len(),
            forwarded: 0,
        };
        for (index, order) in orders.iter().enumerate() {
            let event = OrderAuthorizedEvent::from(order);
            let order_id = event.order_id;
            debug!(
                event_type = OrderAuthorizedEvent::EVENT_TYPE,
                ?event,
                "Publishing integration event"
            );

            if let Err(source) = scope.bus.publish(event).await {
                let unforwarded = orders[index..].to_vec();
                requeue(&scope, unforwarded).await;
                return Err(OrchestratorError::Publish { order_id, source });
            }

            info!(%order_id, "order {} forwarded for stock decrement", order_id);
            report.forwarded += 1;
        }
        Ok(report)
    }
}

/// Hands orders the cycle could not forward back to the query side.
async fn requeue(scope: &CycleScope, orders: Vec<AuthorizedOrder>) {
    let ids = order_ids(&orders);
    warn!(order_ids = ?ids, "Orders not forwarded, requeueing");
    if let Err(e) = scope.queries.requeue(orders).await {
        error!(error = %e, order_ids = ?ids, "Requeue failed, orders may be lost");
    }
}
