use crate::domain::menu::{ItemRef, Price};
use super::aggregate::Order;
use super::errors::OrderError;

// ============================================================================
// Order Builder - Staging Area for an Order
// ============================================================================

/// Accumulates a customer name and items before producing an `Order`.
///
/// `build` consumes the builder. To build twice from the same state,
/// clone it first: both orders then share the same item handles but own
/// separate item lists.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct OrderBuilder {
    customer_name: Option<String>,
    items: Vec<ItemRef>,
    total_cost: Price,
}

impl OrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    /// Append an item, adding its price as it stands right now
    pub fn add_item(mut self, item: ItemRef) -> Self {
        self.total_cost += item.price();
        self.items.push(item);
        self
    }

    /// Running total accumulated so far
    pub fn total_cost(&self) -> Price {
        self.total_cost
    }

    /// Produce the order. Never fails: an empty builder yields an order
    /// with no customer, no items and a zero total.
    pub fn build(self) -> Order {
        let order = Order::new(self.customer_name, self.items, self.total_cost);

        tracing::debug!(
            order_id = %order.id(),
            items = order.items().len(),
            total_cost = %order.total_cost(),
            "Order built"
        );

        order
    }

    /// Like `build`, but rejects an order with no items
    pub fn try_build(self) -> Result<Order, OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        Ok(self.build())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
