//! # Hosted Service
//!
//! Building blocks for recurring background work that lives inside a host process: a timer
//! fires, a unit of work runs, and whatever happens inside that unit stays inside it.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into three layers:
//!
//! 1. **Job Layer** ([`CycleJob`]) - the business logic of one cycle and the scope it runs in
//! 2. **Timing Layer** ([`Trigger`]) - when cycles fire ([`IntervalTrigger`], or
//!    [`ManualTrigger`](mock::ManualTrigger) in tests)
//! 3. **Lifecycle Layer** ([`HostedService`]) - start/stop/dispose, task spawning, error
//!    containment and [`CycleMetrics`]
//!
//! You write the job once; the service handles the timer, the tasks and the failure policy.
//!
//! ## Concurrency Model
//!
//! - One driver task per service waits on the trigger and spawns one task per firing.
//! - The driver never awaits a cycle, so a slow cycle cannot delay the next firing.
//! - Cycles may overlap. Each gets its own scope from [`CycleJob::begin_scope`].
//! - Stop disarms the driver; running cycles finish on their own.
//!
//! ## Failure Model
//!
//! | Where | What happens |
//! |-------|--------------|
//! | `start` | [`ServiceError`] returned to the host (fatal to host start-up) |
//! | inside a cycle | [`CycleFailure`] logged with `error!`, counted, next firing unaffected |
//!
//! ## Example
//!
//! ```rust
//! use hosted_service::{CycleJob, HostedService, IntervalTrigger};
//! use async_trait::async_trait;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Heartbeat;
//!
//! #[async_trait]
//! impl CycleJob for Heartbeat {
//!     type Scope = ();
//!     type Output = u64;
//!     type Error = std::io::Error;
//!
//!     fn begin_scope(&self) -> Result<(), Self::Error> { Ok(()) }
//!
//!     async fn run_cycle(&self, _: (), cycle: u64) -> Result<u64, Self::Error> {
//!         Ok(cycle)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let trigger = IntervalTrigger::new(Duration::ZERO, Duration::from_millis(10))?;
//!     let mut service = HostedService::new(Heartbeat, trigger);
//!     let host = CancellationToken::new();
//!
//!     service.start(&host)?;
//!     service.metrics().wait_for_completed(2).await;
//!     service.stop(&host)?;
//!     service.dispose();
//!     Ok(())
//! }
//! ```

mod cycle;
pub mod error;
pub mod job;
pub mod metrics;
pub mod mock;
pub mod service;
pub mod tracing;
pub mod trigger;

// Re-export core types for convenience
pub use error::{CycleFailure, ServiceError};
pub use job::CycleJob;
pub use metrics::{CycleMetrics, MetricsSnapshot};
pub use service::{HostedService, ServiceState};
pub use trigger::{IntervalTrigger, Trigger, TriggerHandle};
