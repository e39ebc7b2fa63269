//! Indicator values aligned to a price series.

use serde::{Deserialize, Serialize};

/// Indicator values at one bar.
///
/// A field is `None` until its indicator has seen enough bars.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorEntry {
    /// Timestamp of the bar this entry belongs to
    pub timestamp: i64,
    /// Simple moving average of close
    pub sma: Option<f64>,
    /// Upper volatility band
    pub upper_band: Option<f64>,
    /// Lower volatility band
    pub lower_band: Option<f64>,
    /// Relative strength index, 0..=100
    pub rsi: Option<f64>,
    /// Fast EMA minus slow EMA
    pub macd: Option<f64>,
    /// EMA of the MACD line
    pub macd_signal: Option<f64>,
}

impl IndicatorEntry {
    /// An entry with no values yet.
    pub fn undefined(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    /// MACD minus its signal line.
    pub fn macd_histogram(&self) -> Option<f64> {
        Some(self.macd? - self.macd_signal?)
    }

    /// Distance between the bands.
    pub fn band_width(&self) -> Option<f64> {
        Some(self.upper_band? - self.lower_band?)
    }

    /// True when every value is present and finite.
    pub fn is_complete(&self) -> bool {
        [
            self.sma,
            self.upper_band,
            self.lower_band,
            self.rsi,
            self.macd,
            self.macd_signal,
        ]
        .iter()
        .all(|v| v.is_some_and(f64::is_finite))
    }
}

/// Per-bar indicator values, one entry per bar of the source series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorFrame {
    entries: Vec<IndicatorEntry>,
}

impl IndicatorFrame {
    /// Wrap entries already aligned to a series.
    pub fn from_entries(entries: Vec<IndicatorEntry>) -> Self {
        Self { entries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndicatorEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&IndicatorEntry> {
        self.entries.get(index)
    }

    /// Entry for the most recent bar.
    pub fn latest(&self) -> Option<&IndicatorEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorEntry> {
        self.entries.iter()
    }

    /// Number of leading entries that are not yet complete.
    pub fn warmup_len(&self) -> usize {
        self.entries
            .iter()
            .position(IndicatorEntry::is_complete)
            .unwrap_or(self.entries.len())
    }
}
