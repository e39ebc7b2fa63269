//! CLI command implementations.

pub mod analyze;
pub mod init_config;
pub mod validate;
pub mod watch;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tickwatch_config::AppConfig;
use tickwatch_core::traits::PriceProvider;
use tickwatch_core::types::{IndicatorFrame, PriceSeries, Signal};
use tickwatch_data::{load_csv, ReplayProvider, YahooProvider};
use tickwatch_indicators::IndicatorEngine;
use tickwatch_monitor::{ChartData, ChartView};
use tickwatch_signals::ThresholdClassifier;
use tracing::info;

/// Provider plus the history loaded from it.
pub struct Source {
    pub provider: Arc<dyn PriceProvider>,
    pub series: PriceSeries,
}

/// Ticker from the command line, the config file, or stdin.
pub fn resolve_symbol(arg: Option<String>, config: &AppConfig) -> Result<String> {
    let raw = match arg.or_else(|| config.app.default_symbol.clone()) {
        Some(symbol) => symbol,
        None => prompt("Enter stock ticker (e.g., AAPL): ")?,
    };
    normalize_symbol(&raw)
}

fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        bail!("No ticker given");
    }
    Ok(symbol)
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read ticker from stdin")?;
    Ok(line)
}

/// Open the data source and load the history for `symbol`.
///
/// With a CSV file, the trailing `replay_bars` bars are held back and served
/// one per poll; otherwise history comes from Yahoo Finance.
pub async fn load_source(
    symbol: &str,
    data: Option<&Path>,
    replay_bars: usize,
    config: &AppConfig,
) -> Result<Source> {
    let timeframe = config.provider.timeframe;
    let (provider, start, end): (Arc<dyn PriceProvider>, DateTime<Utc>, DateTime<Utc>) = match data
    {
        Some(path) => {
            let bars = load_csv(path, symbol)
                .with_context(|| format!("Failed to load bars from {}", path.display()))?
                .bars()
                .to_vec();
            let initial = bars.len().saturating_sub(replay_bars);
            info!(path = %path.display(), bars = bars.len(), replay = bars.len() - initial, "Loaded CSV data");
            (
                Arc::new(ReplayProvider::new(bars, initial)),
                DateTime::<Utc>::MIN_UTC,
                DateTime::<Utc>::MAX_UTC,
            )
        }
        None => {
            let provider = YahooProvider::new(config.provider.yahoo.clone())?;
            let end = Utc::now();
            let start = end - Duration::days(i64::from(config.provider.history_days));
            (Arc::new(provider), start, end)
        }
    };

    let bars = provider
        .get_historical_bars(symbol, timeframe, start, end)
        .await
        .with_context(|| format!("Error fetching stock data for {symbol}"))?;
    let series = PriceSeries::from_unsorted(symbol, bars)
        .with_context(|| format!("Malformed price data for {symbol}"))?;

    info!(symbol, bars = series.len(), provider = provider.name(), "History loaded");
    Ok(Source { provider, series })
}

/// Engine and classifier built from the config.
pub fn pipeline(config: &AppConfig) -> Result<(IndicatorEngine, ThresholdClassifier)> {
    let engine = IndicatorEngine::new(&config.indicators).context("Invalid indicator settings")?;
    let classifier =
        ThresholdClassifier::new(&config.classifier).context("Invalid classifier settings")?;
    Ok((engine, classifier))
}

/// Show the chart on a blocking thread until the user closes it.
pub async fn show_chart(
    series: &PriceSeries,
    frame: &IndicatorFrame,
    signal: Option<Signal>,
    config: &AppConfig,
) -> Result<()> {
    let data = ChartData::prepare(series, frame, config.monitor.display_days, signal);
    let view = ChartView::new(config.monitor.chart_refresh_ms);
    tokio::task::spawn_blocking(move || view.run(&data))
        .await
        .context("Chart thread panicked")?
        .context("Failed to draw chart")
}
