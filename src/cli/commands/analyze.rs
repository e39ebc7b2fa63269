//! Analyze command implementation.

use anyhow::{Context, Result};
use tickwatch_config::AppConfig;
use tickwatch_monitor::{summary, OutputFormat};
use tickwatch_signals::Classifier;
use tracing::{info, warn};

use super::{load_source, pipeline, resolve_symbol, show_chart};
use crate::cli::AnalyzeArgs;

pub async fn run(args: AnalyzeArgs, config: AppConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let symbol = resolve_symbol(args.ticker, &config)?;
    info!("Initializing analysis for {}", symbol);

    let (engine, classifier) = pipeline(&config)?;
    let source = load_source(&symbol, args.data.as_deref(), 0, &config).await?;
    if let Err(e) = engine.require_warm(&source.series) {
        warn!(error = %e, "Latest bar lacks indicator values, signal will be HOLD");
    }
    let frame = engine.compute(&source.series);
    let signal = classifier
        .classify_latest(&source.series, &frame)
        .with_context(|| format!("No data found for {symbol}"))?;

    if !args.no_chart && config.monitor.show_chart {
        show_chart(&source.series, &frame, Some(signal.clone()), &config).await?;
    }

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&signal)?),
        OutputFormat::Text => println!("{}", summary(&signal)),
    }

    Ok(())
}
