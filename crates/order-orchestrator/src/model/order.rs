//! Orders that have cleared payment authorization and are ready for stock decrement.
//!
//! These values are produced by an [`OrderQueries`](crate::clients::OrderQueries)
//! implementation and only ever read by the orchestrator; each one lives for a single cycle.
use crate::model::ProductId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe identifier for Customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u64);

impl From<u64> for CustomerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl OrderItem {
    pub fn new(product_id: u64, quantity: u32) -> Self {
        Self {
            product_id: ProductId(product_id),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedOrder {
    pub id: OrderId,
    pub customer_id: CustomerId,
    /// Line items in the order they were placed.
    pub items: Vec<OrderItem>,
}

impl AuthorizedOrder {
    /// Creates an authorized order.
    ///
    /// # Arguments
    /// * `id` - Unique order identifier
    /// * `customer_id` - Customer who placed the order
    /// * `items` - `(product, quantity)` pairs, kept in the given order
    pub fn new(id: u64, customer_id: u64, items: impl IntoIterator<Item = (u64, u32)>) -> Self {
        Self {
            id: OrderId(id),
            customer_id: CustomerId(customer_id),
            items: items
                .into_iter()
                .map(|(product, quantity)| OrderItem::new(product, quantity))
                .collect(),
        }
    }
}
