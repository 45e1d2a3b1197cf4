//! # Triggers
//!
//! A [`Trigger`] is the recurring timing primitive behind a hosted service. The service owns
//! it only through a [`TriggerHandle`] once armed, which is what Stop and Dispose act on.
//!
//! - [`IntervalTrigger`] fires on a fixed cadence using `tokio::time::interval`.
//! - [`ManualTrigger`](crate::mock::ManualTrigger) fires when a test tells it to.

use crate::error::ServiceError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// A source of firings.
#[async_trait]
pub trait Trigger: Send + 'static {
    /// Prepares the timing source. Called exactly once, from `HostedService::start`,
    /// inside the tokio runtime.
    fn arm(&mut self) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Waits for the next firing. Returns `false` once the source is exhausted.
    async fn next_firing(&mut self) -> bool;
}

/// Fires after `initial_delay`, then every `period`.
///
/// Firings are scheduled relative to the moment the trigger was armed, not relative to when
/// the previous cycle finished. The driver loop never waits on a cycle, so ticks are only
/// missed if the runtime itself is starved; in that case they are delivered in a burst to keep
/// the cadence.
pub struct IntervalTrigger {
    initial_delay: Duration,
    period: Duration,
    interval: Option<Interval>,
}

impl IntervalTrigger {
    /// Creates a trigger. A zero `period` is rejected with [`ServiceError::InvalidInterval`].
    pub fn new(initial_delay: Duration, period: Duration) -> Result<Self, ServiceError> {
        if period.is_zero() {
            return Err(ServiceError::InvalidInterval);
        }
        Ok(Self {
            initial_delay,
            period,
            interval: None,
        })
    }

    /// Time between two firings.
    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait]
impl Trigger for IntervalTrigger {
    /// Fails with [`ServiceError::InvalidDelay`] if the first or second firing would fall
    /// outside the range of [`Instant`].
    fn arm(&mut self) -> Result<(), ServiceError> {
        let first = Instant::now()
            .checked_add(self.initial_delay)
            .ok_or(ServiceError::InvalidDelay)?;
        first
            .checked_add(self.period)
            .ok_or(ServiceError::InvalidDelay)?;
        let mut interval = time::interval_at(first, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        self.interval = Some(interval);
        Ok(())
    }

    async fn next_firing(&mut self) -> bool {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
                true
            }
            None => false,
        }
    }
}

/// Owned handle to an armed trigger.
///
/// Disarming cancels the driver loop's token so it stops spawning cycles; the handle itself
/// stays alive until it is released. Releasing aborts the driver task.
pub struct TriggerHandle {
    disarm: CancellationToken,
    driver: JoinHandle<()>,
}

impl TriggerHandle {
    pub(crate) fn new(disarm: CancellationToken, driver: JoinHandle<()>) -> Self {
        Self { disarm, driver }
    }

    pub fn disarm(&self) {
        self.disarm.cancel();
    }

    pub fn is_disarmed(&self) -> bool {
        self.disarm.is_cancelled()
    }

    pub fn release(self) {
        self.disarm.cancel();
        self.driver.abort();
    }
}
