//! Technical indicators and the indicator engine.
//!
//! This crate provides the indicators the signal classifier reads:
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD)
//! - Volatility indicators (Standard Deviation, Bollinger Bands)
//!
//! [`IndicatorEngine`] runs all of them over a price series and assembles an
//! [`IndicatorFrame`](tickwatch_core::IndicatorFrame) aligned to its bars.
//! Window sums use SIMD helpers from [`simd`].

mod engine;
pub mod momentum;
pub mod moving_average;
pub mod simd;
pub mod volatility;

pub use engine::{EngineConfig, IndicatorEngine};
pub use momentum::{Macd, MacdOutput, Rsi, RsiSmoothing};
pub use moving_average::{Ema, Sma};
pub use volatility::{BollingerBands, BollingerOutput, StdDev};
