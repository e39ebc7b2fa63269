//! Logging setup.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Setup logging with the given level.
///
/// Events go to stderr so stdout carries only signal output.
/// `RUST_LOG` takes precedence over `level`. When `file` is set, events are
/// also written to a daily-rolling file next to it; keep the returned guard
/// alive until exit so buffered lines are flushed.
pub fn setup_logging(level: &str, json: bool, file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().pretty().with_writer(std::io::stderr).boxed()
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let (dir, prefix) = file_target(path);
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, prefix));
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

/// Split a log file path into the rolling appender's directory and prefix.
fn file_target(path: &Path) -> (&Path, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tickwatch.log".to_string());
    (dir, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_splits_dir_and_prefix() {
        let (dir, prefix) = file_target(Path::new("logs/tickwatch.log"));
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(prefix, "tickwatch.log");
    }

    #[test]
    fn test_file_target_bare_name_uses_current_dir() {
        let (dir, prefix) = file_target(Path::new("watch.log"));
        assert_eq!(dir, Path::new("."));
        assert_eq!(prefix, "watch.log");
    }
}
