use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::menu::{ItemRef, MenuError};
use crate::domain::order::Order;
use crate::metrics::Metrics;
use crate::pipeline::{ChainConfig, ChainReport, HandlerChain, StatusSink};

// ============================================================================
// Demo Scenario
// ============================================================================
//
// One fixed order: a burger plus a pizza-and-cola combo for John Doe,
// run once through receive → prepare → deliver.
//
// ============================================================================

pub struct SampleMenu {
    pub pizza: ItemRef,
    pub burger: ItemRef,
    pub cola: ItemRef,
}

impl SampleMenu {
    pub fn new() -> Result<Self, MenuError> {
        Ok(Self {
            pizza: ItemRef::dish("Pizza", Decimal::new(899, 2))?,
            burger: ItemRef::dish("Burger", Decimal::new(599, 2))?,
            cola: ItemRef::dish("Cola", Decimal::new(199, 2))?,
        })
    }

    /// Pizza and cola as one combo
    pub fn combo(&self) -> Result<ItemRef, MenuError> {
        let combo = ItemRef::composite();
        combo.add_item(self.pizza.clone())?;
        combo.add_item(self.cola.clone())?;
        Ok(combo)
    }
}

pub fn sample_order(menu: &SampleMenu) -> anyhow::Result<Order> {
    let order = Order::builder()
        .customer_name("John Doe")
        .add_item(menu.burger.clone())
        .add_item(menu.combo()?)
        .try_build()?;
    Ok(order)
}

pub fn run(
    sink: Arc<dyn StatusSink>,
    config: ChainConfig,
    metrics: Arc<Metrics>,
) -> anyhow::Result<ChainReport> {
    let menu = SampleMenu::new()?;
    let order = sample_order(&menu)?;

    tracing::info!(
        order_id = %order.id(),
        total_cost = %order.total_cost(),
        "📝 Order assembled"
    );
    tracing::debug!(order = %order.to_json()?, "Order contents");

    let chain = HandlerChain::standard(sink, config).with_metrics(metrics);
    let report = chain.dispatch(&order)?;

    Ok(report)
}
