//! # Cycle Scopes
//!
//! Every cycle gets its own [`CycleScope`]: a fresh query collaborator and a fresh bus handle,
//! created by a [`ScopeFactory`] right before the cycle starts and dropped when it ends.
//! Overlapping cycles therefore never share collaborator instances, and nothing a cycle
//! creates outlives it.

use crate::clients::{InMemoryBus, InMemoryOrderQueries, MessageBus, OrderQueries};
use crate::error::OrchestratorError;

/// The collaborators one cycle works with.
pub struct CycleScope {
    pub queries: Box<dyn OrderQueries>,
    pub bus: Box<dyn MessageBus>,
}

impl CycleScope {
    pub fn new(queries: impl OrderQueries + 'static, bus: impl MessageBus + 'static) -> Self {
        Self {
            queries: Box::new(queries),
            bus: Box::new(bus),
        }
    }
}

/// Creates a new [`CycleScope`] per cycle.
///
/// Closures returning `Result<CycleScope, OrchestratorError>` implement this trait, which is
/// handy for wiring mocks in tests.
pub trait ScopeFactory: Send + Sync + 'static {
    fn create_scope(&self) -> Result<CycleScope, OrchestratorError>;
}

impl<F> ScopeFactory for F
where
    F: Fn() -> Result<CycleScope, OrchestratorError> + Send + Sync + 'static,
{
    fn create_scope(&self) -> Result<CycleScope, OrchestratorError> {
        self()
    }
}

/// Hands each cycle its own handles onto a shared in-memory store and bus.
pub struct InMemoryScopeFactory {
    queries: InMemoryOrderQueries,
    bus: InMemoryBus,
}

impl InMemoryScopeFactory {
    pub fn new(queries: InMemoryOrderQueries, bus: InMemoryBus) -> Self {
        Self { queries, bus }
    }
}

impl ScopeFactory for InMemoryScopeFactory {
    fn create_scope(&self) -> Result<CycleScope, OrchestratorError> {
        Ok(CycleScope::new(self.queries.clone(), self.bus.clone()))
    }
}
