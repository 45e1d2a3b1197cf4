//! # Order Orchestrator
//!
//! A background service that forwards authorized orders to inventory. Every 15 seconds it asks
//! the order query surface for the next authorized order, turns it into an
//! [`OrderAuthorizedEvent`](events::OrderAuthorizedEvent) and publishes that event on the
//! message bus, without ever blocking the host's request path.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`], [`events`])
//! - **Role**: [`AuthorizedOrder`](model::AuthorizedOrder) as read from the query surface, and
//!   the integration event derived from it.
//!
//! ### 2. The Collaborators ([`clients`], [`scope`])
//! - **Role**: [`OrderQueries`](clients::OrderQueries) and [`MessageBus`](clients::MessageBus)
//!   traits, in-memory implementations, and the per-cycle [`CycleScope`](scope::CycleScope).
//!
//! ### 3. The Cycle ([`processor`])
//! - **Role**: [`OrderForwardingJob`](processor::OrderForwardingJob), one
//!   fetch -> transform -> publish -> log pass per firing.
//!
//! ### 4. The Lifecycle ([`lifecycle`])
//! - **Role**: [`OrderOrchestrator`](lifecycle::OrderOrchestrator) wires the job to a
//!   [`hosted_service::HostedService`] and exposes start/stop/dispose to the host.
//!
//! ### 5. Support ([`config`], [`error`], [`mock`])
//! - Environment-driven configuration, error types, and mock collaborators for tests.
//!
//! ## 🚀 Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -p order-orchestrator
//!
//! # Poll every 2 seconds, up to 5 orders per cycle
//! ORDER_ORCHESTRATOR_POLL_INTERVAL_SECS=2 ORDER_ORCHESTRATOR_BATCH_SIZE=5 \
//!     RUST_LOG=debug cargo run -p order-orchestrator
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod mock;
pub mod model;
pub mod processor;
pub mod scope;
