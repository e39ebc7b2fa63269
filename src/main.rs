//! Indicator monitor CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use tickwatch_config::load_config_or_default;
use tickwatch_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = load_config_or_default(&cli.config);

    // Setup logging: command line first, then the config file
    let (level, json, file) = match &loaded {
        Ok(config) => (
            cli.log_level
                .map(|l| l.as_str().to_string())
                .unwrap_or_else(|| config.logging.level.clone()),
            cli.json_logs || config.logging.format == "json",
            config.logging.file.clone(),
        ),
        Err(_) => (
            cli.log_level.map_or("info", |l| l.as_str()).to_string(),
            cli.json_logs,
            None,
        ),
    };
    let _log_guard = setup_logging(&level, json, file.as_deref().map(Path::new));

    // Execute command
    match cli.command {
        Commands::Analyze(args) => cli::commands::analyze::run(args, loaded?).await,
        Commands::Watch(args) => cli::commands::watch::run(args, loaded?).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config),
        Commands::InitConfig(args) => cli::commands::init_config::run(args),
    }
}
