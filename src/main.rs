use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use restaurant_orders::demo;
use restaurant_orders::metrics::Metrics;
use restaurant_orders::pipeline::{ChainConfig, StdoutSink};

fn main() -> anyhow::Result<()> {
    // Status lines go to stdout; diagnostics go to stderr.
    // Default to WARN, with INFO for this crate; override with RUST_LOG.
    // Example: RUST_LOG=restaurant_orders=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,restaurant_orders=info"))
        )
        .init();

    tracing::info!("🚀 Starting restaurant order demo");

    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    let report = demo::run(Arc::new(StdoutSink), ChainConfig::default(), metrics.clone())?;

    tracing::info!(
        order_id = %report.order_id,
        stages = report.completed.len(),
        "🎉 Demo complete!"
    );
    tracing::debug!(metrics = %metrics.render()?, "Final metrics");

    Ok(())
}
