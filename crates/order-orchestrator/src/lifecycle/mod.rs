//! # Orchestrator Lifecycle
//!
//! This module ties the pieces together into something a host process can start and stop.
//!
//! ## The Lifecycle
//!
//! ```text
//! Created --start--> Armed --stop--> Disarmed --dispose--> Released
//! ```
//!
//! 1. **Start** - arms a recurring trigger (no initial delay, 15 s period by default) and
//!    returns at once. Logs `Background service started`.
//! 2. **Firing** - each firing spawns one independent cycle of the
//!    [`OrderForwardingJob`](crate::processor::OrderForwardingJob) with its own scope.
//! 3. **Stop** - disarms the trigger and returns at once. A cycle that already started
//!    finishes on its own. Logs `Background service stopped`.
//! 4. **Dispose** - releases the trigger. Safe before start, safe twice, also done on drop.
//!
//! ## Failure Containment
//!
//! A cycle that fails to fetch, fails to publish, panics or overruns its deadline is logged
//! and counted in [`CycleMetrics`](hosted_service::CycleMetrics). The trigger keeps firing;
//! the next cycle runs on schedule.
//!
//! ## Wiring
//!
//! [`OrderOrchestrator::new`] accepts any [`ScopeFactory`](crate::scope::ScopeFactory), so the
//! same orchestrator works against real collaborators, the in-memory ones
//! ([`OrderOrchestrator::in_memory`]) or mocks.

pub mod orchestrator;

pub use orchestrator::*;
