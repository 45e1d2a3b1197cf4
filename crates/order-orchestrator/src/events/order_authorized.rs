use crate::events::IntegrationEvent;
use crate::model::{AuthorizedOrder, CustomerId, OrderId, OrderItem, ProductId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Published once per authorized order so inventory can decrement stock.
///
/// `items` maps each product to the quantity to decrement. It is built by folding the order's
/// line items in order; when a product appears more than once the last quantity wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAuthorizedEvent {
    pub customer_id: CustomerId,
    pub order_id: OrderId,
    pub items: HashMap<ProductId, u32>,
}

impl OrderAuthorizedEvent {
    pub fn new(customer_id: CustomerId, order_id: OrderId, items: HashMap<ProductId, u32>) -> Self {
        Self {
            customer_id,
            order_id,
            items,
        }
    }
}

impl From<&AuthorizedOrder> for OrderAuthorizedEvent {
    fn from(order: &AuthorizedOrder) -> Self {
        Self::new(order.customer_id, order.id, fold_items(&order.items))
    }
}

impl IntegrationEvent for OrderAuthorizedEvent {
    const EVENT_TYPE: &'static str = "OrderAuthorized";

    fn aggregate_id(&self) -> String {
        self.order_id.to_string()
    }
}

/// Last-write-wins fold of line items into a product -> quantity map.
pub fn fold_items(items: &[OrderItem]) -> HashMap<ProductId, u32> {
    items
        .iter()
        .map(|item| (item.product_id, item.quantity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_maps_each_product_to_its_quantity() {
        let order = AuthorizedOrder::new(1, 9, [(10, 2), (20, 5)]);
        let event = OrderAuthorizedEvent::from(&order);

        let expected = HashMap::from([(ProductId(10), 2), (ProductId(20), 5)]);
        assert_eq!(event.items, expected);
        assert_eq!(event.order_id, OrderId(1));
        assert_eq!(event.customer_id, CustomerId(9));
    }

    #[test]
    fn test_fold_is_independent_of_item_order() {
        let forward = AuthorizedOrder::new(1, 9, [(10, 2), (20, 5)]);
        let reversed = AuthorizedOrder::new(1, 9, [(20, 5), (10, 2)]);

        assert_eq!(
            OrderAuthorizedEvent::from(&forward),
            OrderAuthorizedEvent::from(&reversed)
        );
    }

    /// Duplicate product lines are not summed: the later line replaces the earlier one.
    /// Whether the order service should ever emit duplicates is an open question, so this test
    /// pins the current behaviour rather than endorsing it.
    #[test]
    fn test_duplicate_product_last_quantity_wins() {
        let order = AuthorizedOrder::new(1, 9, [(10, 2), (10, 3)]);
        let event = OrderAuthorizedEvent::from(&order);

        assert_eq!(event.items.len(), 1);
        assert_eq!(event.items[&ProductId(10)], 3);
    }

    #[test]
    fn test_order_without_items_yields_empty_map() {
        let order = AuthorizedOrder::new(1, 9, []);
        assert!(OrderAuthorizedEvent::from(&order).items.is_empty());
    }

    #[test]
    fn test_aggregate_id_is_order_id() {
        let event = OrderAuthorizedEvent::from(&AuthorizedOrder::new(42, 7, [(101, 1)]));
        assert_eq!(event.aggregate_id(), "42");
        assert_eq!(OrderAuthorizedEvent::EVENT_TYPE, "OrderAuthorized");
    }
}
