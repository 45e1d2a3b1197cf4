//! # Mock Collaborators
//!
//! [`MockOrderQueries`] and [`MockMessageBus`] stand in for the real query surface and bus.
//! Queue what each call should return, run a cycle, then inspect what happened.
//!
//! | | MockOrderQueries / MockMessageBus | InMemoryOrderQueries / InMemoryBus |
//! |---|---|---|
//! | **Error injection** | Easy (`return_err`) | Only `BusError::Closed` |
//! | **Call inspection** | `fetch_calls()`, `published()`, `attempts()` | Read the receiver |
//! | **Use case** | Cycle processor unit tests | End-to-end runs |
//!
//! Both mocks are cheap handles over shared state: clone one into a scope factory and keep
//! another to assert on.
//!
//! # Example
//! ```ignore
//! let queries = MockOrderQueries::new();
//! queries.expect_fetch().return_ok(Some(AuthorizedOrder::new(42, 7, [(101, 1)])));
//! let bus = MockMessageBus::new();
//! bus.expect_publish().return_err(BusError::Timeout);
//!
//! let job = OrderForwardingJob::new(mock_scopes(&queries, &bus), 1);
//! assert!(job.run_once().await.is_err());
//!
//! assert_eq!(bus.attempts().len(), 1);
//! queries.verify();
//! bus.verify();
//! ```

use crate::clients::{BusError, MessageBus, OrderQueries, QueryError};
use crate::error::OrchestratorError;
use crate::events::OrderAuthorizedEvent;
use crate::model::AuthorizedOrder;
use crate::scope::CycleScope;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// QUERY MOCK
// =============================================================================

/// Scripted [`OrderQueries`]. Once its expectations run out it behaves like an empty store.
/// Requeued orders are recorded, not offered again.
#[derive(Clone, Default)]
pub struct MockOrderQueries {
    expectations: Arc<Mutex<VecDeque<Result<Option<AuthorizedOrder>, QueryError>>>>,
    calls: Arc<AtomicUsize>,
    requeued: Arc<Mutex<Vec<AuthorizedOrder>>>,
}

impl MockOrderQueries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `fetch_next_authorized` call.
    pub fn expect_fetch(&self) -> FetchExpectationBuilder {
        FetchExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    pub fn fetch_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every order handed back through `requeue`, in call order.
    pub fn requeued(&self) -> Vec<AuthorizedOrder> {
        self.requeued.lock().unwrap().clone()
    }

    /// Panics if any queued expectation was never consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        assert_eq!(remaining, 0, "{} fetch expectation(s) not met", remaining);
    }
}

#[async_trait]
impl OrderQueries for MockOrderQueries {
    async fn fetch_next_authorized(&self) -> Result<Option<AuthorizedOrder>, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.expectations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn requeue(&self, orders: Vec<AuthorizedOrder>) -> Result<(), QueryError> {
        self.requeued.lock().unwrap().extend(orders);
        Ok(())
    }
}

pub struct FetchExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<Result<Option<AuthorizedOrder>, QueryError>>>>,
}

impl FetchExpectationBuilder {
    pub fn return_ok(self, order: Option<AuthorizedOrder>) {
        self.expectations.lock().unwrap().push_back(Ok(order));
    }

    pub fn return_err(self, error: QueryError) {
        self.expectations.lock().unwrap().push_back(Err(error));
    }
}

// =============================================================================
// BUS MOCK
// =============================================================================

/// Scripted [`MessageBus`]. Publishes without a queued expectation succeed.
#[derive(Clone, Default)]
pub struct MockMessageBus {
    expectations: Arc<Mutex<VecDeque<Result<(), BusError>>>>,
    attempts: Arc<Mutex<Vec<OrderAuthorizedEvent>>>,
    published: Arc<Mutex<Vec<OrderAuthorizedEvent>>>,
}

impl MockMessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `publish` call.
    pub fn expect_publish(&self) -> PublishExpectationBuilder {
        PublishExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Every event handed to `publish`, accepted or not.
    pub fn attempts(&self) -> Vec<OrderAuthorizedEvent> {
        self.attempts.lock().unwrap().clone()
    }

    /// Events the mock accepted.
    pub fn published(&self) -> Vec<OrderAuthorizedEvent> {
        self.published.lock().unwrap().clone()
    }

    /// Panics if any queued expectation was never consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        assert_eq!(remaining, 0, "{} publish expectation(s) not met", remaining);
    }
}

#[async_trait]
impl MessageBus for MockMessageBus {
    async fn publish(&self, event: OrderAuthorizedEvent) -> Result<(), BusError> {
        self.attempts.lock().unwrap().push(event.clone());
        let outcome = self
            .expectations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()));
        if outcome.is_ok() {
            self.published.lock().unwrap().push(event);
        }
        outcome
    }
}

pub struct PublishExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<Result<(), BusError>>>>,
}

impl PublishExpectationBuilder {
    pub fn return_ok(self) {
        self.expectations.lock().unwrap().push_back(Ok(()));
    }

    pub fn return_err(self, error: BusError) {
        self.expectations.lock().unwrap().push_back(Err(error));
    }
}

// =============================================================================
// SCOPE FACTORY
// =============================================================================

/// A scope factory handing every cycle clones of the given mocks.
pub fn mock_scopes(
    queries: &MockOrderQueries,
    bus: &MockMessageBus,
) -> impl Fn() -> Result<CycleScope, OrchestratorError> + Send + Sync + 'static {
    let queries = queries.clone();
    let bus = bus.clone();
    move || Ok(CycleScope::new(queries.clone(), bus.clone()))
}
