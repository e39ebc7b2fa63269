//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use tickwatch_config::load_config;

pub fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!(
        "Default symbol: {}",
        config.app.default_symbol.as_deref().unwrap_or("(prompt)")
    );
    println!("Log level: {} ({})", config.logging.level, config.logging.format);
    println!(
        "History: {} days of {} bars",
        config.provider.history_days, config.provider.timeframe
    );
    println!(
        "SMA/bands: {} bars, {} sigma",
        config.indicators.sma_period, config.indicators.band_multiplier
    );
    println!(
        "RSI: {} bars ({:?})",
        config.indicators.rsi_period, config.indicators.rsi_smoothing
    );
    println!(
        "MACD: {}/{}/{}",
        config.indicators.macd_fast, config.indicators.macd_slow, config.indicators.macd_signal
    );
    println!(
        "Thresholds: BUY below RSI {}, SELL above RSI {}",
        config.classifier.buy_rsi_below, config.classifier.sell_rsi_above
    );
    println!(
        "Polling every {}s, chart shows {} days",
        config.monitor.poll_interval_secs, config.monitor.display_days
    );

    Ok(())
}
