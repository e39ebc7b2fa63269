//! Momentum indicators.

use serde::{Deserialize, Serialize};
use tickwatch_core::traits::Indicator;

use crate::moving_average::Ema;
use crate::simd;

/// How RSI averages gains and losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSmoothing {
    /// Plain mean over the trailing window
    #[default]
    Simple,
    /// Wilder's recursive smoothing, seeded with the first plain mean
    Wilder,
}

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    smoothing: RsiSmoothing,
}

impl Rsi {
    /// Create a new RSI indicator over a simple trailing window.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        Self::with_smoothing(period, RsiSmoothing::Simple)
    }

    /// Create an RSI with an explicit smoothing method.
    pub fn with_smoothing(period: usize, smoothing: RsiSmoothing) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period, smoothing }
    }

    /// Oscillator value from average gain and loss.
    ///
    /// No losses saturates at 100; a window with neither gains nor losses
    /// sits at the neutral 50.
    fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                50.0
            } else {
                100.0
            }
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        }
    }

    /// Averages over each trailing window of `period` changes.
    fn simple_averages(values: &[f64], period: usize) -> Vec<f64> {
        values.windows(period).map(simd::mean).collect()
    }

    /// Calculate using Wilder's smoothing method.
    fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
        if values.len() < period {
            return vec![];
        }

        let mut result = Vec::with_capacity(values.len() - period + 1);
        let period_f64 = period as f64;

        let mut avg = simd::mean(&values[..period]);
        result.push(avg);

        // avg = (prev_avg * (period-1) + value) / period
        for &value in &values[period..] {
            avg = (avg * (period_f64 - 1.0) + value) / period_f64;
            result.push(avg);
        }

        result
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
        let (gains, losses) = simd::gains_losses(data);

        let (avg_gains, avg_losses) = match self.smoothing {
            RsiSmoothing::Simple => (
                Self::simple_averages(&gains, self.period),
                Self::simple_averages(&losses, self.period),
            ),
            RsiSmoothing::Wilder => (
                Self::wilder_smooth(&gains, self.period),
                Self::wilder_smooth(&losses, self.period),
            ),
        };

        let mut result = vec![None; data.len().min(self.period)];
        result.extend(
            avg_gains
                .iter()
                .zip(avg_losses.iter())
                .map(|(&gain, &loss)| Some(Self::from_averages(gain, loss))),
        );
        result
    }

    fn warmup(&self) -> usize {
        // One change needs two points, so the first value lands at index `period`
        self.period
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum. All three EMAs are
/// seeded with the first value of their input, so output starts at index 0
/// with a zero MACD line.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Vec<Option<MacdOutput>> {
        let fast_ema = self.fast.series(data);
        let slow_ema = self.slow.series(data);

        let macd_line: Vec<f64> = fast_ema
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = self.signal.series(&macd_line);

        macd_line
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| {
                Some(MacdOutput {
                    macd,
                    signal,
                    histogram: macd - signal,
                })
            })
            .collect()
    }

    fn warmup(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "MACD"
    }
}
