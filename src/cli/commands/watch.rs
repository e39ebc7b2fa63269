//! Watch command implementation.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tickwatch_config::AppConfig;
use tickwatch_monitor::{ConsolePrinter, Poller, PollerConfig};
use tracing::{info, warn};

use super::{load_source, pipeline, resolve_symbol, show_chart};
use crate::cli::WatchArgs;

pub async fn run(args: WatchArgs, config: AppConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let symbol = resolve_symbol(args.ticker, &config)?;
    println!("Initializing analysis for {symbol}...");

    let (engine, classifier) = pipeline(&config)?;
    let replay_bars = if args.data.is_some() { args.replay_bars } else { 0 };
    let source = load_source(&symbol, args.data.as_deref(), replay_bars, &config).await?;

    if let Err(e) = engine.require_warm(&source.series) {
        warn!(error = %e, "History too short for a complete indicator set");
    }

    let interval_secs = args.interval.unwrap_or(config.monitor.poll_interval_secs).max(1);
    let mut poller = Poller::new(
        Arc::clone(&source.provider),
        engine,
        Box::new(classifier),
        source.series,
        PollerConfig {
            interval: Duration::from_secs(interval_secs),
            timeframe: config.provider.timeframe,
            max_ticks: args.max_ticks,
        },
    );

    if !args.no_chart && config.monitor.show_chart {
        show_chart(poller.series(), poller.frame(), poller.current_signal(), &config).await?;
    }

    println!("Starting live monitoring (Ctrl+C to exit)...");
    let printer = ConsolePrinter::new(args.output);
    let summary = poller.run(|signal| printer.print(signal)).await;
    println!("\nMonitoring stopped.");

    if summary.ticks > 0 && summary.failures == summary.ticks {
        warn!(ticks = summary.ticks, "Every poll failed");
    }
    info!(
        ticks = summary.ticks,
        failures = summary.failures,
        bars = poller.series().len(),
        "Watch finished"
    );

    Ok(())
}
