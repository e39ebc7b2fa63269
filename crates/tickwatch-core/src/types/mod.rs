//! Core data types.

mod frame;
mod ohlcv;
mod signal;
mod timeframe;

pub use frame::{IndicatorEntry, IndicatorFrame};
pub use ohlcv::{Bar, PriceSeries};
pub use signal::{Signal, SignalType};
pub use timeframe::Timeframe;
