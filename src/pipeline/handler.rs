use std::fmt;
use std::sync::Arc;

use crate::domain::order::Order;
use super::errors::ProcessingError;
use super::sink::StatusSink;
use super::stage::Stage;

// ============================================================================
// Order Handler - One Link in the Processing Chain
// ============================================================================
//
// A handler pairs a stage with its processing function and an optional
// successor. Chains are walked with a loop rather than by each handler
// calling the next, so stack depth does not grow with chain length.
//
// A handler has to be wrapped in an `Arc` before it can become someone's
// successor, and from then on it cannot be rewired, so a chain can never
// loop back on itself.
//
// ============================================================================

pub type ProcessFn = dyn Fn(&Order) -> Result<(), ProcessingError> + Send + Sync;

pub struct OrderHandler {
    stage: Stage,
    process: Box<ProcessFn>,
    next: Option<Arc<OrderHandler>>,
}

impl OrderHandler {
    pub fn new<F>(stage: Stage, process: F) -> Self
    where
        F: Fn(&Order) -> Result<(), ProcessingError> + Send + Sync + 'static,
    {
        Self {
            stage,
            process: Box::new(process),
            next: None,
        }
    }

    /// Stage that writes `"<label>: <order>"` to `sink` and never fails
    pub fn announcing(stage: Stage, sink: Arc<dyn StatusSink>) -> Self {
        let label = stage.label().to_string();
        Self::new(stage, move |order| {
            sink.emit(&format!("{}: {}", label, order));
            Ok(())
        })
    }

    pub fn receive(sink: Arc<dyn StatusSink>) -> Self {
        Self::announcing(Stage::Receive, sink)
    }

    pub fn prepare(sink: Arc<dyn StatusSink>) -> Self {
        Self::announcing(Stage::Prepare, sink)
    }

    pub fn deliver(sink: Arc<dyn StatusSink>) -> Self {
        Self::announcing(Stage::Deliver, sink)
    }

    /// Wire `handlers` front to back and return the head, or `None` for an
    /// empty list
    pub fn link(handlers: Vec<OrderHandler>) -> Option<OrderHandler> {
        let mut handlers = handlers.into_iter().rev();
        let mut head = handlers.next()?;
        for mut handler in handlers {
            handler.set_next(Arc::new(head));
            head = handler;
        }
        Some(head)
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn next(&self) -> Option<&Arc<OrderHandler>> {
        self.next.as_ref()
    }

    /// Set the successor, replacing any previous one
    pub fn set_next(&mut self, next: Arc<OrderHandler>) {
        if let Some(previous) = self.next.replace(next) {
            tracing::debug!(
                stage = %self.stage,
                replaced = %previous.stage,
                "Successor replaced"
            );
        }
    }

    /// Run only this stage's processing
    pub fn process(&self, order: &Order) -> Result<(), ProcessingError> {
        (self.process)(order)
    }

    /// This handler followed by each successor in turn
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            current: Some(self),
        }
    }

    /// Number of handlers from here to the end of the chain
    pub fn chain_len(&self) -> usize {
        self.iter().count()
    }

    /// Run this stage and every successor on `order`, stopping at the
    /// first failure
    pub fn handle_order(&self, order: &Order) -> Result<(), ProcessingError> {
        self.handle_order_with(order, |_, _| {})
    }

    /// Like `handle_order`, calling `observe` with each stage and its
    /// outcome before moving on
    pub fn handle_order_with<F>(&self, order: &Order, mut observe: F) -> Result<(), ProcessingError>
    where
        F: FnMut(&Stage, &Result<(), ProcessingError>),
    {
        for handler in self.iter() {
            tracing::trace!(stage = %handler.stage, order_id = %order.id(), "Handling order");
            let outcome = handler.process(order);
            observe(&handler.stage, &outcome);
            outcome?;
        }
        Ok(())
    }
}

impl fmt::Debug for OrderHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|handler| &handler.stage))
            .finish()
    }
}

impl Drop for OrderHandler {
    // Unlink successors one at a time; the default drop would recurse
    // once per handler.
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(handler) = next {
            match Arc::try_unwrap(handler) {
                Ok(mut handler) => next = handler.next.take(),
                Err(_) => break,
            }
        }
    }
}

pub struct ChainIter<'a> {
    current: Option<&'a OrderHandler>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a OrderHandler;

    fn next(&mut self) -> Option<Self::Item> {
        let handler = self.current?;
        self.current = handler.next.as_deref();
        Some(handler)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu::ItemRef;
    use crate::pipeline::sink::MemorySink;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;

    fn test_order() -> Order {
        Order::builder()
            .customer_name("John Doe")
            .add_item(ItemRef::dish("Burger", Decimal::new(599, 2)).unwrap())
            .build()
    }

    #[test]
    fn test_chain_runs_in_wiring_order() {
        let sink = Arc::new(MemorySink::new());
        let mut receive = OrderHandler::receive(sink.clone());
        let mut prepare = OrderHandler::prepare(sink.clone());
        let deliver = OrderHandler::deliver(sink.clone());

        prepare.set_next(Arc::new(deliver));
        receive.set_next(Arc::new(prepare));

        let order = test_order();
        receive.handle_order(&order).unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("Order received: {}", order));
        assert_eq!(lines[1], format!("Order is being prepared: {}", order));
        assert_eq!(lines[2], format!("Order is being delivered: {}", order));
    }

    #[test]
    fn test_every_stage_sees_same_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handlers = (0..3)
            .map(|i| {
                let seen = Arc::clone(&seen);
                OrderHandler::new(Stage::Custom(format!("h{}", i)), move |order: &Order| {
                    seen.lock().push(order as *const Order as usize);
                    Ok(())
                })
            })
            .collect();
        let head = OrderHandler::link(handlers).unwrap();

        let order = test_order();
        head.handle_order(&order).unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|addr| *addr == &order as *const Order as usize));
    }

    #[test]
    fn test_lone_handler_runs_once() {
        let sink = Arc::new(MemorySink::new());
        let handler = OrderHandler::deliver(sink.clone());

        handler.handle_order(&test_order()).unwrap();

        assert_eq!(sink.lines().len(), 1);
        assert!(handler.next().is_none());
    }

    #[test]
    fn test_set_next_overwrites_successor() {
        let sink = Arc::new(MemorySink::new());
        let mut receive = OrderHandler::receive(sink.clone());
        receive.set_next(Arc::new(OrderHandler::prepare(sink.clone())));
        receive.set_next(Arc::new(OrderHandler::deliver(sink.clone())));

        receive.handle_order(&test_order()).unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Order is being delivered: "));
    }

    #[test]
    fn test_failure_stops_chain() {
        let sink = Arc::new(MemorySink::new());
        let reject = OrderHandler::new(Stage::Custom("inspect".to_string()), |order: &Order| {
            Err(ProcessingError::stage_failed(
                Stage::Custom("inspect".to_string()),
                order,
                "kitchen closed",
            ))
        });
        let head = OrderHandler::link(vec![
            OrderHandler::receive(sink.clone()),
            reject,
            OrderHandler::deliver(sink.clone()),
        ])
        .unwrap();

        let result = head.handle_order(&test_order());

        assert!(matches!(result.unwrap_err(), ProcessingError::StageFailed { .. }));
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_observer_sees_stages_up_to_failure() {
        let sink = Arc::new(MemorySink::new());
        let head = OrderHandler::link(vec![
            OrderHandler::receive(sink.clone()),
            OrderHandler::new(Stage::Custom("inspect".to_string()), |order: &Order| {
                Err(ProcessingError::stage_failed(
                    Stage::Custom("inspect".to_string()),
                    order,
                    "kitchen closed",
                ))
            }),
            OrderHandler::deliver(sink.clone()),
        ])
        .unwrap();

        let mut observed = Vec::new();
        let result = head.handle_order_with(&test_order(), |stage, outcome| {
            observed.push((stage.clone(), outcome.is_ok()));
        });

        assert!(result.is_err());
        assert_eq!(
            observed,
            vec![
                (Stage::Receive, true),
                (Stage::Custom("inspect".to_string()), false),
            ]
        );
    }

    #[test]
    fn test_link_empty_is_none() {
        assert!(OrderHandler::link(Vec::new()).is_none());
    }

    #[test]
    fn test_link_preserves_order() {
        let sink: Arc<dyn StatusSink> = Arc::new(MemorySink::new());
        let head = OrderHandler::link(vec![
            OrderHandler::receive(sink.clone()),
            OrderHandler::prepare(sink.clone()),
            OrderHandler::deliver(sink),
        ])
        .unwrap();

        let stages: Vec<_> = head.iter().map(|h| h.stage().clone()).collect();
        assert_eq!(stages, vec![Stage::Receive, Stage::Prepare, Stage::Deliver]);
        assert_eq!(head.chain_len(), 3);
        assert_eq!(format!("{:?}", head), "[Receive, Prepare, Deliver]");
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let handlers = (0..100_000)
            .map(|_| OrderHandler::new(Stage::Custom("noop".to_string()), |_: &Order| Ok(())))
            .collect();
        let head = OrderHandler::link(handlers).unwrap();

        head.handle_order(&test_order()).unwrap();
        assert_eq!(head.chain_len(), 100_000);
        drop(head);
    }

    #[test]
    fn test_shared_tail_survives_head_drop() {
        let sink = Arc::new(MemorySink::new());
        let tail = Arc::new(OrderHandler::deliver(sink.clone()));

        let mut head = OrderHandler::receive(sink.clone());
        head.set_next(Arc::clone(&tail));
        drop(head);

        tail.handle_order(&test_order()).unwrap();
        assert_eq!(sink.lines().len(), 1);
    }
}
