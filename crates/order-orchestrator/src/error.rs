//! Error types for the order orchestrator.

use crate::clients::{BusError, QueryError};
use crate::config::ConfigError;
use crate::model::OrderId;
use hosted_service::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The query collaborator failed; nothing was published this cycle.
    #[error("Fetch of authorized orders failed: {0}")]
    Fetch(#[from] QueryError),

    /// The bus refused the event for `order_id`; the order was not forwarded.
    #[error("Publish failed for order {order_id}: {source}")]
    Publish {
        order_id: OrderId,
        #[source]
        source: BusError,
    },

    /// The per-cycle collaborators could not be created.
    #[error("Cycle scope unavailable: {0}")]
    Scope(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
