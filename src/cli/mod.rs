//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tickwatch_monitor::OutputFormat;

#[derive(Parser)]
#[command(name = "tickwatch")]
#[command(author, version, about = "Technical indicator monitor with buy/hold/sell signals")]
pub struct Cli {
    /// Configuration file path (built-in defaults when missing)
    #[arg(short, long, default_value = "config/default.toml", env = "TICKWATCH_CONFIG")]
    pub config: PathBuf,

    /// Log level (overrides the config file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute indicators, show the chart and print the current signal
    Analyze(AnalyzeArgs),
    /// Analyze, then poll for new bars and print a signal every interval
    Watch(WatchArgs),
    /// Validate configuration
    ValidateConfig,
    /// Write the default configuration as TOML
    InitConfig(InitConfigArgs),
}

#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Ticker symbol (prompted for when omitted)
    pub ticker: Option<String>,

    /// Read bars from a CSV file instead of Yahoo Finance
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Skip the interactive chart
    #[arg(long)]
    pub no_chart: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// Ticker symbol (prompted for when omitted)
    pub ticker: Option<String>,

    /// Read bars from a CSV file and replay its trailing bars as live data
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Number of trailing CSV bars held back for replay
    #[arg(long, default_value = "20", requires = "data")]
    pub replay_bars: usize,

    /// Seconds between polls (overrides the config file)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Skip the interactive chart
    #[arg(long)]
    pub no_chart: bool,

    /// Stop after this many polls
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct InitConfigArgs {
    /// Destination file
    #[arg(default_value = "config/default.toml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}
