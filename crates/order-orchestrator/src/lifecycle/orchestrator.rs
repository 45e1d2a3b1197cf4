use crate::clients::{InMemoryBus, InMemoryOrderQueries};
use crate::config::{check_bus_buffer, OrchestratorConfig};
use crate::error::OrchestratorError;
use crate::events::OrderAuthorizedEvent;
use crate::processor::OrderForwardingJob;
use crate::scope::{InMemoryScopeFactory, ScopeFactory};
use hosted_service::{CycleMetrics, HostedService, IntervalTrigger, ServiceState, Trigger};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The background orchestrator that forwards authorized orders to inventory.
///
/// `OrderOrchestrator` is responsible for:
/// - **Wiring**: building the [`OrderForwardingJob`] from a [`ScopeFactory`] and the config
/// - **Timing**: an [`IntervalTrigger`] with the configured initial delay and poll interval
/// - **Lifecycle**: delegating start/stop/dispose to the underlying [`HostedService`]
///
/// # Example
///
/// ```ignore
/// let (mut orchestrator, orders, mut events) = OrderOrchestrator::in_memory(&config)?;
/// orchestrator.start(&host)?;
///
/// orders.authorize(AuthorizedOrder::new(42, 7, [(101, 1)]));
/// let event = events.recv().await;
///
/// orchestrator.stop(&host)?;
/// orchestrator.dispose();
/// ```
pub struct OrderOrchestrator<F: ScopeFactory> {
    service: HostedService<OrderForwardingJob<F>>,
}

impl<F: ScopeFactory> OrderOrchestrator<F> {
    /// Creates an orchestrator polling on the configured interval.
    ///
    /// # Errors
    /// [`OrchestratorError::Service`] if the interval is zero.
    pub fn new(config: &OrchestratorConfig, scopes: F) -> Result<Self, OrchestratorError> {
        let trigger = IntervalTrigger::new(config.initial_delay, config.poll_interval)?;
        Ok(Self::with_trigger(config, scopes, trigger))
    }

    /// Creates an orchestrator driven by any trigger; the config's timing fields are ignored.
    pub fn with_trigger(config: &OrchestratorConfig, scopes: F, trigger: impl Trigger) -> Self {
        let job = OrderForwardingJob::new(scopes, config.batch_size);
        let service = HostedService::new(job, trigger).with_cycle_timeout(config.cycle_timeout);
        Self { service }
    }

    /// Arms the trigger; the first cycle runs after `initial_delay`.
    pub fn start(&mut self, cancel: &CancellationToken) -> Result<(), OrchestratorError> {
        Ok(self.service.start(cancel)?)
    }

    /// Stops new cycles from being triggered. Cycles in flight keep running.
    pub fn stop(&mut self, cancel: &CancellationToken) -> Result<(), OrchestratorError> {
        Ok(self.service.stop(cancel)?)
    }

    /// Releases the trigger. Safe before `start` and more than once.
    pub fn dispose(&mut self) {
        self.service.dispose();
    }

    pub fn state(&self) -> ServiceState {
        self.service.state()
    }

    pub fn metrics(&self) -> CycleMetrics {
        self.service.metrics()
    }

    pub fn job(&self) -> &OrderForwardingJob<F> {
        self.service.job()
    }
}

impl OrderOrchestrator<InMemoryScopeFactory> {
    /// Wires an orchestrator to an in-memory order store and bus.
    ///
    /// Returns the orchestrator, the store handle used to authorize orders and the receiver
    /// published events arrive on.
    ///
    /// # Errors
    /// [`OrchestratorError::Config`] if `bus_buffer` exceeds
    /// [`MAX_BUS_BUFFER`](crate::config::MAX_BUS_BUFFER), [`OrchestratorError::Service`] if the
    /// poll interval is zero.
    pub fn in_memory(
        config: &OrchestratorConfig,
    ) -> Result<
        (
            Self,
            InMemoryOrderQueries,
            mpsc::Receiver<OrderAuthorizedEvent>,
        ),
        OrchestratorError,
    > {
        let orders = InMemoryOrderQueries::new();
        let buffer = check_bus_buffer(config.bus_buffer.max(1))?;
        let (bus, events) = InMemoryBus::new(buffer);
        let scopes = InMemoryScopeFactory::new(orders.clone(), bus);
        let orchestrator = Self::new(config, scopes)?;
        Ok((orchestrator, orders, events))
    }
}
