use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::menu::item::write_list;
use crate::domain::menu::{ItemRef, Price};
use super::builder::OrderBuilder;
use super::errors::OrderError;

// ============================================================================
// Order - Immutable Snapshot of a Customer's Selection
// ============================================================================
//
// `total_cost` is captured item by item while the order is being built.
// The items themselves are live handles, so a combo changed after it was
// added shows up in `items()` and `recomputed_total()` but never in
// `total_cost()`.
//
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    id: Uuid,
    customer_name: Option<String>,
    items: Vec<ItemRef>,
    total_cost: Price,
    created_at: DateTime<Utc>,
}

impl Order {
    pub fn builder() -> OrderBuilder {
        OrderBuilder::new()
    }

    pub(super) fn new(customer_name: Option<String>, items: Vec<ItemRef>, total_cost: Price) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_name,
            items,
            total_cost,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    pub fn items(&self) -> &[ItemRef] {
        &self.items
    }

    /// Total captured at build time
    pub fn total_cost(&self) -> Price {
        self.total_cost
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of the current item prices
    pub fn recomputed_total(&self) -> Price {
        self.items.iter().map(ItemRef::price).sum()
    }

    /// True when an item changed after it was added to the builder
    pub fn is_total_stale(&self) -> bool {
        self.recomputed_total() != self.total_cost
    }

    pub fn to_json(&self) -> Result<String, OrderError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order{{customerName='{}', items=",
            self.customer_name.as_deref().unwrap_or("null")
        )?;
        write_list(f, &self.items)?;
        write!(f, ", totalCost={}}}", self.total_cost)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
