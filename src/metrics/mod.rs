use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::pipeline::Stage;

// ============================================================================
// Metrics Module - Prometheus metrics for order processing
// ============================================================================
//
// Provides metrics for:
// - Orders run through a handler chain
// - Stage invocations and failures, labelled by stage
// - Time spent running a full chain
//
// Metrics are kept in a private registry and rendered in the Prometheus
// text format on demand.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub orders_processed: IntCounter,
    pub stage_invocations: IntCounterVec,
    pub stage_failures: IntCounterVec,
    pub chain_duration: Histogram,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_processed = IntCounter::new(
            "orders_processed_total",
            "Total orders run through a handler chain",
        )?;
        registry.register(Box::new(orders_processed.clone()))?;

        let stage_invocations = IntCounterVec::new(
            Opts::new("order_stage_invocations_total", "Total stage invocations"),
            &["stage"],
        )?;
        registry.register(Box::new(stage_invocations.clone()))?;

        let stage_failures = IntCounterVec::new(
            Opts::new("order_stage_failures_total", "Total stage invocations that rejected the order"),
            &["stage"],
        )?;
        registry.register(Box::new(stage_failures.clone()))?;

        let chain_duration = Histogram::with_opts(
            HistogramOpts::new("order_chain_duration_seconds", "Time to run one order through the chain")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        )?;
        registry.register(Box::new(chain_duration.clone()))?;

        Ok(Self {
            registry,
            orders_processed,
            stage_invocations,
            stage_failures,
            chain_duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one stage run
    pub fn record_stage(&self, stage: &Stage, success: bool) {
        self.stage_invocations.with_label_values(&[stage.name()]).inc();
        if !success {
            self.stage_failures.with_label_values(&[stage.name()]).inc();
        }
    }

    /// Helper to record a finished chain run
    pub fn record_order(&self, duration_secs: f64) {
        self.orders_processed.inc();
        self.chain_duration.observe(duration_secs);
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> anyhow::Result<String> {
        Ok(TextEncoder::new().encode_to_string(&self.registry.gather())?)
    }
}
