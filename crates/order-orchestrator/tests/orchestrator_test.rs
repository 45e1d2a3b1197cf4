use async_trait::async_trait;
use hosted_service::mock::{LogCapture, ManualTrigger};
use hosted_service::{ServiceError, ServiceState};
use order_orchestrator::clients::{BusError, MessageBus, QueryError};
use order_orchestrator::config::{ConfigError, OrchestratorConfig};
use order_orchestrator::error::OrchestratorError;
use order_orchestrator::events::OrderAuthorizedEvent;
use order_orchestrator::lifecycle::OrderOrchestrator;
use order_orchestrator::mock::{mock_scopes, MockMessageBus, MockOrderQueries};
use order_orchestrator::model::{AuthorizedOrder, CustomerId, OrderId, ProductId};
use order_orchestrator::scope::CycleScope;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A bus whose publish blocks until the test opens the gate.
#[derive(Clone, Default)]
struct GatedBus {
    entered: Arc<Notify>,
    gate: Arc<Notify>,
    delivered: Arc<Mutex<Vec<OrderAuthorizedEvent>>>,
}

#[async_trait]
impl MessageBus for GatedBus {
    async fn publish(&self, event: OrderAuthorizedEvent) -> Result<(), BusError> {
        self.entered.notify_one();
        self.gate.notified().await;
        self.delivered.lock().unwrap().push(event);
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_first_order_forwarded_immediately() {
    let (logs, _guard) = LogCapture::install();
    let config = OrchestratorConfig::default();
    let (mut orchestrator, orders, mut events) = OrderOrchestrator::in_memory(&config).unwrap();
    orders.authorize(AuthorizedOrder::new(42, 7, [(101, 1), (102, 4)]));

    let host = CancellationToken::new();
    let began = Instant::now();
    orchestrator.start(&host).unwrap();
    assert_eq!(orchestrator.state(), ServiceState::Armed);

    let event = events.recv().await.unwrap();
    assert_eq!(began.elapsed(), Duration::ZERO, "no initial delay");
    assert_eq!(
        event,
        OrderAuthorizedEvent::new(
            CustomerId(7),
            OrderId(42),
            HashMap::from([(ProductId(101), 1), (ProductId(102), 4)]),
        )
    );

    orchestrator.metrics().wait_for_completed(1).await;
    assert_eq!(logs.count_containing("order 42 forwarded for stock decrement"), 1);
    assert_eq!(logs.count_containing("Background service started"), 1);
    assert_eq!(orders.pending(), 0);

    orchestrator.stop(&host).unwrap();
    orchestrator.dispose();
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_next_order_waits_for_next_poll() {
    let config = OrchestratorConfig::default();
    let (mut orchestrator, orders, mut events) = OrderOrchestrator::in_memory(&config).unwrap();
    let host = CancellationToken::new();
    let began = Instant::now();
    orchestrator.start(&host).unwrap();

    // First cycle finds nothing.
    orchestrator.metrics().wait_for_completed(1).await;
    orders.authorize(AuthorizedOrder::new(43, 8, [(103, 2)]));

    tokio::time::sleep(Duration::from_secs(14)).await;
    assert!(events.try_recv().is_err(), "nothing before the next poll");

    let event = events.recv().await.unwrap();
    assert_eq!(event.order_id, OrderId(43));
    assert_eq!(began.elapsed(), Duration::from_secs(15));

    orchestrator.stop(&host).unwrap();
}

#[tokio::test]
async fn test_each_fetched_order_is_published_at_most_once() {
    let queries = MockOrderQueries::new();
    queries
        .expect_fetch()
        .return_ok(Some(AuthorizedOrder::new(42, 7, [(101, 1)])));
    let bus = MockMessageBus::new();
    let (trigger, ticks) = ManualTrigger::new();
    let mut orchestrator = OrderOrchestrator::with_trigger(
        &OrchestratorConfig::default(),
        mock_scopes(&queries, &bus),
        trigger,
    );
    orchestrator.start(&CancellationToken::new()).unwrap();

    for _ in 0..3 {
        ticks.fire();
    }
    orchestrator.metrics().wait_for_completed(3).await;

    assert_eq!(queries.fetch_calls(), 3);
    assert_eq!(bus.attempts().len(), 1);
    assert_eq!(bus.published()[0].order_id, OrderId(42));
}

#[tokio::test]
async fn test_idle_cycles_publish_and_log_nothing() {
    let (logs, _guard) = LogCapture::install();
    let queries = MockOrderQueries::new();
    let bus = MockMessageBus::new();
    let (trigger, ticks) = ManualTrigger::new();
    let mut orchestrator = OrderOrchestrator::with_trigger(
        &OrchestratorConfig::default(),
        mock_scopes(&queries, &bus),
        trigger,
    );
    orchestrator.start(&CancellationToken::new()).unwrap();

    ticks.fire();
    ticks.fire();
    orchestrator.metrics().wait_for_completed(2).await;

    assert!(bus.attempts().is_empty());
    assert!(!logs.contains("forwarded for stock decrement"));
    assert_eq!(orchestrator.metrics().snapshot().succeeded, 2);
}

#[tokio::test]
async fn test_fetch_failure_is_logged_and_next_cycle_runs() {
    let (logs, _guard) = LogCapture::install();
    let queries = MockOrderQueries::new();
    queries
        .expect_fetch()
        .return_err(QueryError::Unavailable("read replica down".into()));
    queries
        .expect_fetch()
        .return_ok(Some(AuthorizedOrder::new(42, 7, [(101, 1)])));
    let bus = MockMessageBus::new();
    let (trigger, ticks) = ManualTrigger::new();
    let mut orchestrator = OrderOrchestrator::with_trigger(
        &OrchestratorConfig::default(),
        mock_scopes(&queries, &bus),
        trigger,
    );
    orchestrator.start(&CancellationToken::new()).unwrap();

    ticks.fire();
    orchestrator.metrics().wait_for_completed(1).await;
    assert!(logs.contains("Cycle failed"));
    assert!(logs.contains("read replica down"));
    assert_eq!(orchestrator.state(), ServiceState::Armed);

    ticks.fire();
    orchestrator.metrics().wait_for_completed(2).await;

    let snapshot = orchestrator.metrics().snapshot();
    assert_eq!((snapshot.failed, snapshot.succeeded), (1, 1));
    assert_eq!(bus.published().len(), 1);
    assert_eq!(logs.count_containing("order 42 forwarded for stock decrement"), 1);
    queries.verify();
}

#[tokio::test]
async fn test_publish_failure_is_logged_and_next_cycle_runs() {
    let (logs, _guard) = LogCapture::install();
    let queries = MockOrderQueries::new();
    queries
        .expect_fetch()
        .return_ok(Some(AuthorizedOrder::new(42, 7, [(101, 1)])));
    queries
        .expect_fetch()
        .return_ok(Some(AuthorizedOrder::new(43, 7, [(101, 1)])));
    let bus = MockMessageBus::new();
    bus.expect_publish().return_err(BusError::Closed);
    let (trigger, ticks) = ManualTrigger::new();
    let mut orchestrator = OrderOrchestrator::with_trigger(
        &OrchestratorConfig::default(),
        mock_scopes(&queries, &bus),
        trigger,
    );
    orchestrator.start(&CancellationToken::new()).unwrap();

    ticks.fire();
    orchestrator.metrics().wait_for_completed(1).await;
    ticks.fire();
    orchestrator.metrics().wait_for_completed(2).await;

    assert!(!logs.contains("order 42 forwarded"));
    assert_eq!(logs.count_containing("order 43 forwarded for stock decrement"), 1);
    assert_eq!(bus.attempts().len(), 2);
    assert_eq!(orchestrator.metrics().snapshot().failed, 1);
}

#[tokio::test]
async fn test_stop_returns_while_publish_is_in_flight() {
    let queries = MockOrderQueries::new();
    queries
        .expect_fetch()
        .return_ok(Some(AuthorizedOrder::new(42, 7, [(101, 1)])));
    let bus = GatedBus::default();
    let scopes = {
        let (queries, bus) = (queries.clone(), bus.clone());
        move || Ok::<_, OrchestratorError>(CycleScope::new(queries.clone(), bus.clone()))
    };
    let (trigger, ticks) = ManualTrigger::new();
    let mut orchestrator =
        OrderOrchestrator::with_trigger(&OrchestratorConfig::default(), scopes, trigger);
    let host = CancellationToken::new();
    orchestrator.start(&host).unwrap();

    ticks.fire();
    bus.entered.notified().await;

    orchestrator.stop(&host).unwrap();
    assert_eq!(orchestrator.state(), ServiceState::Disarmed);
    assert_eq!(orchestrator.metrics().snapshot().in_flight(), 1);

    bus.gate.notify_one();
    orchestrator.metrics().wait_for_completed(1).await;
    assert_eq!(bus.delivered.lock().unwrap().len(), 1);
    assert_eq!(orchestrator.metrics().snapshot().succeeded, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cycle_timeout_fails_stuck_cycle() {
    let (logs, _guard) = LogCapture::install();
    let queries = MockOrderQueries::new();
    queries
        .expect_fetch()
        .return_ok(Some(AuthorizedOrder::new(42, 7, [(101, 1)])));
    let bus = GatedBus::default();
    let scopes = {
        let (queries, bus) = (queries.clone(), bus.clone());
        move || Ok::<_, OrchestratorError>(CycleScope::new(queries.clone(), bus.clone()))
    };
    let config = OrchestratorConfig {
        cycle_timeout: Some(Duration::from_secs(5)),
        ..OrchestratorConfig::default()
    };
    let (trigger, ticks) = ManualTrigger::new();
    let mut orchestrator = OrderOrchestrator::with_trigger(&config, scopes, trigger);
    orchestrator.start(&CancellationToken::new()).unwrap();

    ticks.fire();
    orchestrator.metrics().wait_for_completed(1).await;

    assert_eq!(orchestrator.metrics().snapshot().failed, 1);
    assert!(logs.contains("Cycle exceeded deadline of 5s"));
    assert!(bus.delivered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_cycle_forwards_up_to_batch_size() {
    let queries = MockOrderQueries::new();
    for id in 1..=4 {
        queries
            .expect_fetch()
            .return_ok(Some(AuthorizedOrder::new(id, 7, [(101, 1)])));
    }
    let bus = MockMessageBus::new();
    let config = OrchestratorConfig {
        batch_size: 3,
        ..OrchestratorConfig::default()
    };
    let (trigger, ticks) = ManualTrigger::new();
    let mut orchestrator =
        OrderOrchestrator::with_trigger(&config, mock_scopes(&queries, &bus), trigger);
    orchestrator.start(&CancellationToken::new()).unwrap();

    ticks.fire();
    orchestrator.metrics().wait_for_completed(1).await;
    assert_eq!(bus.published().len(), 3);

    ticks.fire();
    orchestrator.metrics().wait_for_completed(2).await;
    let ids: Vec<_> = bus.published().iter().map(|e| e.order_id).collect();
    assert_eq!(ids, vec![OrderId(1), OrderId(2), OrderId(3), OrderId(4)]);
}

#[tokio::test]
async fn test_lifecycle_errors_surface_as_orchestrator_errors() {
    let (trigger, _ticks) = ManualTrigger::new();
    let mut orchestrator = OrderOrchestrator::with_trigger(
        &OrchestratorConfig::default(),
        mock_scopes(&MockOrderQueries::new(), &MockMessageBus::new()),
        trigger,
    );
    let host = CancellationToken::new();
    orchestrator.start(&host).unwrap();

    assert!(matches!(
        orchestrator.start(&host),
        Err(OrchestratorError::Service(_))
    ));
}

#[tokio::test]
async fn test_dispose_releases_trigger_and_is_idempotent() {
    let (trigger, ticks) = ManualTrigger::new();
    let mut orchestrator = OrderOrchestrator::with_trigger(
        &OrchestratorConfig::default(),
        mock_scopes(&MockOrderQueries::new(), &MockMessageBus::new()),
        trigger,
    );
    orchestrator.start(&CancellationToken::new()).unwrap();

    orchestrator.dispose();
    orchestrator.dispose();
    for _ in 0..100 {
        if ticks.is_released() {
            break;
        }
        tokio::task::yield_now().await;
    }

    assert_eq!(orchestrator.state(), ServiceState::Released);
    assert!(ticks.is_released());
}

#[test]
fn test_zero_poll_interval_is_rejected() {
    let config = OrchestratorConfig {
        poll_interval: Duration::ZERO,
        ..OrchestratorConfig::default()
    };
    assert!(matches!(
        OrderOrchestrator::in_memory(&config),
        Err(OrchestratorError::Service(_))
    ));
}

#[tokio::test]
async fn test_unschedulable_initial_delay_fails_start() {
    let config = OrchestratorConfig {
        initial_delay: Duration::MAX,
        ..OrchestratorConfig::default()
    };
    let (mut orchestrator, _orders, _events) = OrderOrchestrator::in_memory(&config).unwrap();

    assert!(matches!(
        orchestrator.start(&CancellationToken::new()),
        Err(OrchestratorError::Service(ServiceError::InvalidDelay))
    ));
    assert_eq!(orchestrator.state(), ServiceState::Created);
}

#[test]
fn test_oversized_bus_buffer_is_rejected() {
    let config = OrchestratorConfig {
        bus_buffer: usize::MAX,
        ..OrchestratorConfig::default()
    };
    assert!(matches!(
        OrderOrchestrator::in_memory(&config),
        Err(OrchestratorError::Config(ConfigError::TooLarge { .. }))
    ));
}
