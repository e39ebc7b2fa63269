//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SeriesError;

/// One sampling interval of market activity.
/// Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds (UTC)
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }

    /// Calendar date of the bar in UTC.
    pub fn date(&self) -> NaiveDate {
        self.datetime().date_naive()
    }

    /// Check that every field is a usable number.
    ///
    /// Prices must be finite and positive, volume finite and non-negative.
    pub fn check(&self, index: usize) -> Result<(), SeriesError> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (field, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Err(SeriesError::MalformedBar {
                    index,
                    reason: format!("{} must be a positive number, got {}", field, value),
                });
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(SeriesError::MalformedBar {
                index,
                reason: format!("volume must be non-negative, got {}", self.volume),
            });
        }
        Ok(())
    }
}

/// Ordered, time-ascending bars for one symbol with unique timestamps.
///
/// The series is immutable once built; [`PriceSeries::merge`] returns a new
/// series rather than extending this one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, rejecting it whole if any bar is malformed,
    /// out of order, or shares a timestamp with its predecessor.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            bar.check(index)?;
            if index > 0 {
                let previous = bars[index - 1].timestamp;
                if bar.timestamp == previous {
                    return Err(SeriesError::DuplicateTimestamp {
                        index,
                        timestamp: bar.timestamp,
                    });
                }
                if bar.timestamp < previous {
                    return Err(SeriesError::OutOfOrder {
                        index,
                        timestamp: bar.timestamp,
                        previous,
                    });
                }
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// Create an empty series.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    /// Build a series from bars in any order.
    ///
    /// Bars are sorted by timestamp; on a timestamp collision the bar that
    /// appears later in the input wins.
    pub fn from_unsorted(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let mut by_time = BTreeMap::new();
        for (index, bar) in bars.into_iter().enumerate() {
            bar.check(index)?;
            by_time.insert(bar.timestamp, bar);
        }
        Ok(Self {
            symbol: symbol.into(),
            bars: by_time.into_values().collect(),
        })
    }

    /// Symbol identifier.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get all bars as a slice.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get the last bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Get a bar by index (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Extract volumes as a vector.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Get an iterator over the bars.
    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }

    /// Series holding only the first `len` bars.
    pub fn prefix(&self, len: usize) -> PriceSeries {
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars[..len.min(self.bars.len())].to_vec(),
        }
    }

    /// Index of the first bar at or after `timestamp`.
    pub fn position_from(&self, timestamp: i64) -> usize {
        self.bars.partition_point(|b| b.timestamp < timestamp)
    }

    /// Union of this series and `incoming`, sorted by timestamp.
    ///
    /// An incoming bar replaces an existing bar with the same timestamp, so a
    /// still-forming session bar is overwritten by its latest poll.
    pub fn merge(&self, incoming: &[Bar]) -> Result<PriceSeries, SeriesError> {
        let mut by_time: BTreeMap<i64, Bar> =
            self.bars.iter().map(|b| (b.timestamp, *b)).collect();
        for (index, bar) in incoming.iter().enumerate() {
            bar.check(index)?;
            by_time.insert(bar.timestamp, *bar);
        }
        Ok(Self {
            symbol: self.symbol.clone(),
            bars: by_time.into_values().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar::new(ts, close, close + 1.0, close - 1.0, close, 1000.0)
    }

    #[test]
    fn test_bar_check() {
        assert!(bar(1, 100.0).check(0).is_ok());

        let mut bad = bar(1, 100.0);
        bad.close = f64::NAN;
        assert!(matches!(
            bad.check(3),
            Err(SeriesError::MalformedBar { index: 3, .. })
        ));

        let mut negative_volume = bar(1, 100.0);
        negative_volume.volume = -1.0;
        assert!(negative_volume.check(0).is_err());
    }

    #[test]
    fn test_bar_date() {
        // 2024-01-15 00:00:00 UTC
        let bar = bar(1_705_276_800_000, 100.0);
        assert_eq!(bar.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_series_rejects_duplicates() {
        let result = PriceSeries::new("AAPL", vec![bar(1, 100.0), bar(1, 101.0)]);
        assert_eq!(
            result,
            Err(SeriesError::DuplicateTimestamp {
                index: 1,
                timestamp: 1
            })
        );
    }

    #[test]
    fn test_series_rejects_out_of_order() {
        let result = PriceSeries::new("AAPL", vec![bar(2, 100.0), bar(1, 101.0)]);
        assert!(matches!(result, Err(SeriesError::OutOfOrder { index: 1, .. })));
    }

    #[test]
    fn test_series_rejects_malformed_bar() {
        let mut bars = vec![bar(1, 100.0), bar(2, 101.0)];
        bars[1].open = 0.0;
        assert!(PriceSeries::new("AAPL", bars).is_err());
    }

    #[test]
    fn test_series_extractions() {
        let series = PriceSeries::new("AAPL", vec![bar(1, 100.5), bar(2, 101.5)]).unwrap();

        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.closes(), vec![100.5, 101.5]);
        assert_eq!(series.volumes(), vec![1000.0, 1000.0]);
        assert_eq!(series.last().unwrap().timestamp, 2);
    }

    #[test]
    fn test_from_unsorted_keeps_last_duplicate() {
        let series =
            PriceSeries::from_unsorted("AAPL", vec![bar(3, 103.0), bar(1, 101.0), bar(3, 99.0)])
                .unwrap();

        let timestamps: Vec<i64> = series.iter().map(|b| b.timestamp).collect();
        assert_eq!(timestamps, vec![1, 3]);
        assert_eq!(series.last().unwrap().close, 99.0);
    }

    #[test]
    fn test_merge_newer_bar_wins() {
        let series = PriceSeries::new("AAPL", vec![bar(1, 100.0), bar(2, 101.0)]).unwrap();
        let merged = series.merge(&[bar(2, 105.0), bar(3, 106.0)]).unwrap();

        assert_eq!(merged.closes(), vec![100.0, 105.0, 106.0]);
        // The original is untouched.
        assert_eq!(series.closes(), vec![100.0, 101.0]);
    }

    #[test]
    fn test_merge_rejects_malformed_incoming() {
        let series = PriceSeries::new("AAPL", vec![bar(1, 100.0)]).unwrap();
        let mut incoming = bar(2, 101.0);
        incoming.high = f64::INFINITY;
        assert!(series.merge(&[incoming]).is_err());
    }

    #[test]
    fn test_prefix_and_position() {
        let series =
            PriceSeries::new("AAPL", vec![bar(10, 10.0), bar(20, 20.0), bar(30, 30.0)]).unwrap();

        assert_eq!(series.prefix(2).closes(), vec![10.0, 20.0]);
        assert_eq!(series.prefix(10).len(), 3);
        assert_eq!(series.position_from(15), 1);
        assert_eq!(series.position_from(30), 2);
        assert_eq!(series.position_from(31), 3);
    }
}
