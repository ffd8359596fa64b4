use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::domain::order::Order;
use crate::metrics::Metrics;
use super::config::{ChainConfig, FailurePolicy};
use super::errors::ProcessingError;
use super::handler::OrderHandler;
use super::sink::StatusSink;
use super::stage::Stage;

// ============================================================================
// Handler Chain - Runs Orders Through Wired Handlers
// ============================================================================
//
// Wraps the head of a handler chain with a failure policy and optional
// metrics. Handlers keep no per-order state, so one chain can serve many
// orders at once; `process_batch` does exactly that on the blocking pool.
//
// ============================================================================

/// Outcome of running one order through the chain
#[derive(Debug, Clone)]
pub struct ChainReport {
    pub order_id: Uuid,
    pub completed: Vec<Stage>,
    pub failures: Vec<ProcessingError>,
}

impl ChainReport {
    fn new(order_id: Uuid) -> Self {
        Self {
            order_id,
            completed: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// True when no stage failed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct HandlerChain {
    head: OrderHandler,
    config: ChainConfig,
    metrics: Option<Arc<Metrics>>,
}

impl HandlerChain {
    pub fn new(head: OrderHandler, config: ChainConfig) -> Self {
        Self {
            head,
            config,
            metrics: None,
        }
    }

    /// Receive → prepare → deliver, each announcing to `sink`
    pub fn standard(sink: Arc<dyn StatusSink>, config: ChainConfig) -> Self {
        let mut prepare = OrderHandler::prepare(Arc::clone(&sink));
        prepare.set_next(Arc::new(OrderHandler::deliver(Arc::clone(&sink))));

        let mut receive = OrderHandler::receive(sink);
        receive.set_next(Arc::new(prepare));

        Self::new(receive, config)
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.head.iter().map(|handler| handler.stage().clone()).collect()
    }

    /// Run `order` through every stage, applying the failure policy
    pub fn dispatch(&self, order: &Order) -> Result<ChainReport, ProcessingError> {
        let span = tracing::info_span!("dispatch", order_id = %order.id());
        let _enter = span.enter();

        let started = Instant::now();
        let mut report = ChainReport::new(order.id());

        match self.config.failure_policy {
            FailurePolicy::Abort => {
                let outcome = self
                    .head
                    .handle_order_with(order, |stage, outcome| self.observe(&mut report, stage, outcome));
                if let Err(error) = outcome {
                    self.finish(started);
                    return Err(error);
                }
            }
            FailurePolicy::Continue => {
                for handler in self.head.iter() {
                    let outcome = handler.process(order);
                    self.observe(&mut report, handler.stage(), &outcome);
                    if let Err(error) = outcome {
                        report.failures.push(error);
                    }
                }
            }
        }

        self.finish(started);
        tracing::info!(
            stages = report.completed.len(),
            failures = report.failures.len(),
            "Order processed"
        );

        Ok(report)
    }

    fn observe(&self, report: &mut ChainReport, stage: &Stage, outcome: &Result<(), ProcessingError>) {
        if let Some(metrics) = &self.metrics {
            metrics.record_stage(stage, outcome.is_ok());
        }

        match outcome {
            Ok(()) => {
                tracing::debug!(stage = %stage, "Stage completed");
                report.completed.push(stage.clone());
            }
            Err(error) => tracing::warn!(stage = %stage, error = %error, "Stage failed"),
        }
    }

    fn finish(&self, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_order(started.elapsed().as_secs_f64());
        }
    }

    /// Run independent orders through this chain concurrently.
    ///
    /// At most `max_concurrency` orders are in flight. Results come back
    /// in the same order as `orders`.
    pub async fn process_batch(
        self: &Arc<Self>,
        orders: Vec<Arc<Order>>,
    ) -> Vec<Result<ChainReport, ProcessingError>> {
        let total = orders.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();

        tracing::debug!(orders = total, max_concurrency = self.config.max_concurrency, "Starting batch");

        for (index, order) in orders.into_iter().enumerate() {
            let chain = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (index, Err(ProcessingError::TaskFailed(e.to_string()))),
                };

                let result = tokio::task::spawn_blocking(move || chain.dispatch(&order))
                    .await
                    .unwrap_or_else(|e| Err(ProcessingError::TaskFailed(e.to_string())));

                (index, result)
            });
        }

        let mut results: Vec<Option<Result<ChainReport, ProcessingError>>> =
            (0..total).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "Batch task aborted"),
            }
        }

        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(ProcessingError::TaskFailed("task ended without a result".to_string()))
                })
            })
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
