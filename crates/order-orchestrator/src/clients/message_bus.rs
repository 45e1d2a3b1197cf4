//! # Message Bus
//!
//! Write side: where integration events go. Delivery guarantees belong to the transport; the
//! orchestrator only assumes a successful `publish` means the broker accepted the event.
use crate::events::{IntegrationEvent, OrderAuthorizedEvent};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Errors raised by the bus transport.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BusError {
    /// No consumer is listening any more.
    #[error("Message bus closed")]
    Closed,

    /// The broker refused the event.
    #[error("Message bus rejected event: {0}")]
    Rejected(String),

    /// The broker did not acknowledge in time.
    #[error("Message bus timed out")]
    Timeout,
}

#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publishes one event. The event is moved in; the caller keeps nothing of it.
    async fn publish(&self, event: OrderAuthorizedEvent) -> Result<(), BusError>;
}

/// A bus backed by a bounded tokio channel.
///
/// The receiving half plays the consumer (inventory) side. Publishing waits while the channel
/// is full and fails with [`BusError::Closed`] once the receiver is dropped.
#[derive(Clone)]
pub struct InMemoryBus {
    sender: mpsc::Sender<OrderAuthorizedEvent>,
}

impl InMemoryBus {
    /// Creates the bus and the receiver consumers read from.
    ///
    /// # Panics
    /// Panics if `buffer` is zero or above [`MAX_BUS_BUFFER`](crate::config::MAX_BUS_BUFFER).
    /// `OrchestratorConfig::from_lookup` and `OrderOrchestrator::in_memory` reject both.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<OrderAuthorizedEvent>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, event: OrderAuthorizedEvent) -> Result<(), BusError> {
        debug!(
            event_type = OrderAuthorizedEvent::EVENT_TYPE,
            key = %event.aggregate_id(),
            "Publishing"
        );
        self.sender.send(event).await.map_err(|_| BusError::Closed)
    }
}
