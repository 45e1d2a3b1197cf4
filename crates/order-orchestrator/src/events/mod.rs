//! # Integration Events
//!
//! Messages describing a fact that happened in the order service, consumed asynchronously by
//! other services (inventory, logistics) through a [`MessageBus`](crate::clients::MessageBus).

pub mod order_authorized;

pub use order_authorized::*;

/// Common surface of every integration event.
pub trait IntegrationEvent: std::fmt::Debug + Send + Sync + 'static {
    /// Stable name consumers route on.
    const EVENT_TYPE: &'static str;

    /// Identifier of the aggregate the event is about, used as a log/partition key.
    fn aggregate_id(&self) -> String;
}
