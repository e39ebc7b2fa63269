//! Core types and traits for the indicator monitor.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, PriceSeries, Timeframe)
//! - Indicator output types (IndicatorEntry, IndicatorFrame)
//! - Trading signals (Signal, SignalType)
//! - Core traits for indicators and price providers

pub mod types;
pub mod traits;
pub mod error;

pub use error::{TickwatchError, TickwatchResult};
pub use types::*;
pub use traits::*;
