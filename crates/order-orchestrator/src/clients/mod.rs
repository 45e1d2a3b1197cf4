//! # Collaborator Interfaces
//!
//! The orchestrator talks to two external collaborators, each hidden behind a trait so cycles
//! can be given fresh instances and tests can substitute mocks:
//!
//! - [`OrderQueries`] - the query surface returning authorized orders
//! - [`MessageBus`] - the transport integration events are published to
//!
//! In-memory implementations ([`InMemoryOrderQueries`], [`InMemoryBus`]) back the demo binary
//! and the end-to-end tests.

pub mod message_bus;
pub mod order_queries;

pub use message_bus::*;
pub use order_queries::*;
