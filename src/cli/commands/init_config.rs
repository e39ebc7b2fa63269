//! Init configuration command.

use anyhow::{bail, Context, Result};
use tickwatch_config::AppConfig;
use tracing::info;

use crate::cli::InitConfigArgs;

pub fn run(args: InitConfigArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        );
    }

    if let Some(dir) = args.path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let text = AppConfig::default().to_toml()?;
    std::fs::write(&args.path, text)
        .with_context(|| format!("Failed to write {}", args.path.display()))?;

    info!(path = %args.path.display(), "Wrote default configuration");
    println!("Wrote {}", args.path.display());
    Ok(())
}
