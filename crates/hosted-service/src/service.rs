//! # Hosted Service
//!
//! [`HostedService`] is the lifecycle controller: it plugs a recurring background activity into
//! the host's own start/stop sequence.
//!
//! ```text
//! Created --start--> Armed --stop--> Disarmed --dispose--> Released
//!    \_______________________dispose_______________________/
//! ```
//!
//! Start arms the trigger and returns immediately. Every firing spawns an independent cycle
//! task. Stop disarms the trigger and returns immediately too: cycles already running are left
//! to finish on their own. There is no way back from Disarmed to Armed; a service lives as long
//! as its host process.

use crate::cycle::spawn_cycle;
use crate::error::ServiceError;
use crate::job::CycleJob;
use crate::metrics::CycleMetrics;
use crate::trigger::{Trigger, TriggerHandle};
use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Created,
    Armed,
    Disarmed,
    Released,
}

impl Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::Created => "created",
            ServiceState::Armed => "armed",
            ServiceState::Disarmed => "disarmed",
            ServiceState::Released => "released",
        };
        f.write_str(name)
    }
}

/// Runs a [`CycleJob`] every time a [`Trigger`] fires.
pub struct HostedService<J: CycleJob> {
    job: Arc<J>,
    trigger: Option<Box<dyn Trigger>>,
    handle: Option<TriggerHandle>,
    state: ServiceState,
    cycle_timeout: Option<Duration>,
    metrics: CycleMetrics,
}

impl<J: CycleJob> HostedService<J> {
    pub fn new(job: J, trigger: impl Trigger) -> Self {
        Self {
            job: Arc::new(job),
            trigger: Some(Box::new(trigger)),
            handle: None,
            state: ServiceState::Created,
            cycle_timeout: None,
            metrics: CycleMetrics::new(),
        }
    }

    /// Puts every cycle under a deadline. `None` (the default) lets cycles run unbounded.
    pub fn with_cycle_timeout(mut self, cycle_timeout: Option<Duration>) -> Self {
        self.cycle_timeout = cycle_timeout;
        self
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn metrics(&self) -> CycleMetrics {
        self.metrics.clone()
    }

    pub fn job(&self) -> &J {
        &self.job
    }

    /// Arms the trigger and returns without waiting for any cycle.
    ///
    /// # Errors
    /// - [`ServiceError::InvalidTransition`] if the service was already started or released.
    /// - [`ServiceError::StartCancelled`] if the host cancelled `cancel` before the call.
    /// - [`ServiceError::RuntimeUnavailable`] when called outside a tokio runtime.
    /// - Whatever [`Trigger::arm`] reports.
    pub fn start(&mut self, cancel: &CancellationToken) -> Result<(), ServiceError> {
        if self.state != ServiceState::Created {
            return Err(ServiceError::InvalidTransition {
                from: self.state,
                action: "start",
            });
        }
        if cancel.is_cancelled() {
            return Err(ServiceError::StartCancelled);
        }
        let runtime = Handle::try_current().map_err(|_| ServiceError::RuntimeUnavailable)?;

        let mut trigger = self.trigger.take().ok_or(ServiceError::InvalidTransition {
            from: self.state,
            action: "start",
        })?;
        trigger.arm()?;

        let disarm = CancellationToken::new();
        let driver = runtime.spawn(
            drive(
                trigger,
                self.job.clone(),
                disarm.clone(),
                self.cycle_timeout,
                self.metrics.clone(),
            )
            .in_current_span(),
        );
        self.handle = Some(TriggerHandle::new(disarm, driver));
        self.state = ServiceState::Armed;

        info!(service = self.job.name(), "Background service started");
        Ok(())
    }

    /// Disarms the trigger. In-flight cycles are neither cancelled nor awaited.
    ///
    /// Stopping a service that is not armed does nothing.
    pub fn stop(&mut self, _cancel: &CancellationToken) -> Result<(), ServiceError> {
        if self.state != ServiceState::Armed {
            debug!(service = self.job.name(), state = %self.state, "Stop ignored");
            return Ok(());
        }
        if let Some(handle) = &self.handle {
            handle.disarm();
        }
        self.state = ServiceState::Disarmed;

        info!(service = self.job.name(), "Background service stopped");
        Ok(())
    }

    /// Releases the trigger. Safe to call before `start` and more than once.
    pub fn dispose(&mut self) {
        if self.state == ServiceState::Released {
            return;
        }
        if let Some(handle) = self.handle.take() {
            handle.release();
        }
        self.trigger = None;
        self.state = ServiceState::Released;
        debug!(service = self.job.name(), "Background service released");
    }
}

impl<J: CycleJob> Drop for HostedService<J> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// The driver loop: waits on the trigger, spawns a cycle, repeats. Never awaits a cycle.
async fn drive<J: CycleJob>(
    mut trigger: Box<dyn Trigger>,
    job: Arc<J>,
    disarm: CancellationToken,
    cycle_timeout: Option<Duration>,
    metrics: CycleMetrics,
) {
    let mut cycle: u64 = 0;
    loop {
        tokio::select! {
            biased;
            _ = disarm.cancelled() => break,
            fired = trigger.next_firing() => {
                if !fired {
                    debug!(service = job.name(), "Trigger exhausted");
                    break;
                }
                cycle += 1;
                spawn_cycle(job.clone(), cycle, cycle_timeout, metrics.clone());
            }
        }
    }
    debug!(service = job.name(), fired = cycle, "Trigger driver exited");
}
