//! # Order Queries
//!
//! Read side of the order service. Implementations must tolerate concurrent callers from
//! overlapping cycles and must never hand the same order to two callers.
//!
//! A cycle that fetched orders but could not forward them hands them back through
//! [`OrderQueries::requeue`], so they are offered again on a later cycle.
use crate::model::{AuthorizedOrder, OrderId};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Errors raised by the order query surface.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    /// The backing store could not be reached.
    #[error("Order store unavailable: {0}")]
    Unavailable(String),

    /// The query ran but failed.
    #[error("Order query failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait OrderQueries: Send + Sync {
    /// Returns the next authorized order, or `None` when there is nothing to forward.
    async fn fetch_next_authorized(&self) -> Result<Option<AuthorizedOrder>, QueryError>;

    /// Hands back orders that were fetched but not forwarded, in fetch order. They must be
    /// offered again, ahead of orders authorized later.
    ///
    /// The default does nothing, for stores that only mark an order as forwarded after its
    /// event was published.
    async fn requeue(&self, orders: Vec<AuthorizedOrder>) -> Result<(), QueryError> {
        let _ = orders;
        Ok(())
    }

    /// Returns up to `limit` authorized orders by calling
    /// [`fetch_next_authorized`](OrderQueries::fetch_next_authorized) until it comes back empty.
    ///
    /// Any fetch failure fails the whole batch. Orders fetched before the failure are
    /// requeued, so nothing is published from a batch that could not be read completely.
    async fn fetch_authorized(&self, limit: usize) -> Result<Vec<AuthorizedOrder>, QueryError> {
        let mut batch = Vec::with_capacity(limit);
        while batch.len() < limit {
            match self.fetch_next_authorized().await {
                Ok(Some(order)) => batch.push(order),
                Ok(None) => break,
                Err(e) => {
                    if !batch.is_empty() {
                        warn!(
                            error = %e,
                            order_ids = ?order_ids(&batch),
                            "Fetch interrupted, requeueing partial batch"
                        );
                        if let Err(requeue_error) = self.requeue(batch).await {
                            error!(error = %requeue_error, "Requeue failed");
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(batch)
    }
}

/// Ids of `orders`, for log fields.
pub fn order_ids(orders: &[AuthorizedOrder]) -> Vec<OrderId> {
    orders.iter().map(|order| order.id).collect()
}

/// FIFO of authorized orders shared between the order service side (which calls
/// [`authorize`](InMemoryOrderQueries::authorize)) and the orchestrator's cycles.
///
/// Fetching removes the order, so concurrent cycles can never receive the same one.
#[derive(Clone, Default)]
pub struct InMemoryOrderQueries {
    pending: Arc<Mutex<VecDeque<AuthorizedOrder>>>,
}

impl InMemoryOrderQueries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an order as authorized and ready to forward.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub fn authorize(&self, order: AuthorizedOrder) {
        debug!("Order authorized");
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(order);
    }

    /// Number of authorized orders not yet fetched.
    pub fn pending(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl OrderQueries for InMemoryOrderQueries {
    async fn fetch_next_authorized(&self) -> Result<Option<AuthorizedOrder>, QueryError> {
        let order = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        Ok(order)
    }

    async fn requeue(&self, orders: Vec<AuthorizedOrder>) -> Result<(), QueryError> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        for order in orders.into_iter().rev() {
            pending.push_front(order);
        }
        Ok(())
    }
}
