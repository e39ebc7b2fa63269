//! Presentation and driving of the indicator pipeline.
//!
//! - [`setup_logging`]: tracing subscriber (stderr plus optional log file)
//! - [`ConsolePrinter`]: one line per signal, as text or JSON
//! - [`ChartView`]: interactive terminal chart of price, bands and volume
//! - [`Poller`]: fetch, merge, recompute and classify on a fixed interval

mod chart;
mod console;
mod logging;
mod poller;

pub use chart::{volume_scale, ChartData, ChartView, Viewport};
pub use console::{signal_json, signal_line, summary, ConsolePrinter, OutputFormat};
pub use logging::setup_logging;
pub use poller::{Poller, PollerConfig, RunSummary};
