//! Volatility indicators.

use serde::{Deserialize, Serialize};
use tickwatch_core::traits::Indicator;

use crate::simd;

/// Population standard deviation over a trailing window.
#[derive(Debug, Clone)]
pub struct StdDev {
    period: usize,
}

impl StdDev {
    /// Create a new standard deviation indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        Self { period }
    }

    /// Window length.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Population standard deviation of `window` around its `mean`.
    pub fn of_window(window: &[f64], mean: f64) -> f64 {
        simd::variance(window, mean).sqrt()
    }
}

impl Indicator for StdDev {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
        let mut result = vec![None; data.len().min(self.period - 1)];
        result.extend(data.windows(self.period).map(|window| {
            Some(Self::of_window(window, simd::mean(window)))
        }));
        result
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }

    fn name(&self) -> &str {
        "StdDev"
    }
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    /// Upper band
    pub upper: f64,
    /// Middle band (SMA)
    pub middle: f64,
    /// Lower band
    pub lower: f64,
    /// Population standard deviation of the window
    pub std_dev: f64,
}

/// Bollinger Bands.
///
/// A middle band (SMA) with upper and lower bands at a fixed number of
/// population standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    std_dev: StdDev,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// Create new Bollinger Bands with default parameters (20, 2.0).
    pub fn new() -> Self {
        Self::with_params(20, 2.0)
    }

    /// Create Bollinger Bands with custom parameters.
    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        assert!(
            std_dev_multiplier > 0.0,
            "Std dev multiplier must be positive"
        );
        Self {
            std_dev: StdDev::new(period),
            std_dev_multiplier,
        }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerOutput;

    fn calculate(&self, data: &[f64]) -> Vec<Option<BollingerOutput>> {
        let period = self.std_dev.period();
        let mut result = vec![None; data.len().min(period - 1)];
        result.extend(data.windows(period).map(|window| {
            let middle = simd::mean(window);
            let std_dev = StdDev::of_window(window, middle);
            let offset = self.std_dev_multiplier * std_dev;

            Some(BollingerOutput {
                upper: middle + offset,
                middle,
                lower: middle - offset,
                std_dev,
            })
        }));
        result
    }

    fn warmup(&self) -> usize {
        self.std_dev.warmup()
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}
