//! Runs every indicator over a price series.

use serde::{Deserialize, Serialize};
use tickwatch_core::error::IndicatorError;
use tickwatch_core::traits::Indicator;
use tickwatch_core::types::{IndicatorEntry, IndicatorFrame, PriceSeries};
use tracing::debug;

use crate::momentum::{Macd, Rsi, RsiSmoothing};
use crate::moving_average::Sma;
use crate::volatility::BollingerBands;

/// Indicator periods and multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SMA and Bollinger window
    pub sma_period: usize,
    /// Band offset in standard deviations
    pub band_multiplier: f64,
    /// RSI window
    pub rsi_period: usize,
    /// RSI averaging method
    pub rsi_smoothing: RsiSmoothing,
    /// Fast EMA span
    pub macd_fast: usize,
    /// Slow EMA span
    pub macd_slow: usize,
    /// Signal line EMA span
    pub macd_signal: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sma_period: 20,
            band_multiplier: 2.0,
            rsi_period: 14,
            rsi_smoothing: RsiSmoothing::Simple,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), IndicatorError> {
        if self.sma_period < 2 {
            return Err(IndicatorError::InvalidParameter(
                "SMA period must be at least 2".into(),
            ));
        }
        if !(self.band_multiplier.is_finite() && self.band_multiplier > 0.0) {
            return Err(IndicatorError::InvalidParameter(
                "Band multiplier must be positive".into(),
            ));
        }
        if self.rsi_period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "RSI period must be greater than 0".into(),
            ));
        }
        if self.macd_fast == 0 || self.macd_signal == 0 {
            return Err(IndicatorError::InvalidParameter(
                "MACD spans must be greater than 0".into(),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(IndicatorError::InvalidParameter(format!(
                "MACD fast span ({}) must be less than slow span ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        Ok(())
    }
}

/// Computes an [`IndicatorFrame`] from a [`PriceSeries`].
///
/// The engine holds no state between calls: every call recomputes the frame
/// from the full series it is given.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    sma: Sma,
    bands: BollingerBands,
    rsi: Rsi,
    macd: Macd,
}

impl IndicatorEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: &EngineConfig) -> Result<Self, IndicatorError> {
        config.validate()?;
        Ok(Self {
            sma: Sma::new(config.sma_period),
            bands: BollingerBands::with_params(config.sma_period, config.band_multiplier),
            rsi: Rsi::with_smoothing(config.rsi_period, config.rsi_smoothing),
            macd: Macd::with_periods(config.macd_fast, config.macd_slow, config.macd_signal),
        })
    }

    /// Number of leading bars before every indicator has a value.
    pub fn warmup(&self) -> usize {
        self.sma
            .warmup()
            .max(self.bands.warmup())
            .max(self.rsi.warmup())
            .max(self.macd.warmup())
    }

    /// Check that the latest bar of `series` will get a complete entry.
    ///
    /// Reports the largest shortfall among the indicators.
    pub fn require_warm(&self, series: &PriceSeries) -> Result<(), IndicatorError> {
        let closes = series.closes();
        [
            self.sma.validate_data(&closes),
            self.bands.validate_data(&closes),
            self.rsi.validate_data(&closes),
            self.macd.validate_data(&closes),
        ]
        .into_iter()
        .filter_map(Result::err)
        .max_by_key(|e| match e {
            IndicatorError::InsufficientData { required, .. } => *required,
            IndicatorError::InvalidParameter(_) => 0,
        })
        .map_or(Ok(()), Err)
    }

    /// Compute one entry per bar.
    ///
    /// Entries before an indicator's lookback carry `None` for it; a short
    /// series is never an error.
    pub fn compute(&self, series: &PriceSeries) -> IndicatorFrame {
        let closes = series.closes();

        let sma = self.sma.calculate(&closes);
        let bands = self.bands.calculate(&closes);
        let rsi = self.rsi.calculate(&closes);
        let macd = self.macd.calculate(&closes);

        let entries = series
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorEntry {
                timestamp: bar.timestamp,
                sma: sma[i],
                upper_band: bands[i].map(|b| b.upper),
                lower_band: bands[i].map(|b| b.lower),
                rsi: rsi[i],
                macd: macd[i].map(|m| m.macd),
                macd_signal: macd[i].map(|m| m.signal),
            })
            .collect();

        debug!(
            symbol = series.symbol(),
            bars = series.len(),
            "Computed indicator frame"
        );

        IndicatorFrame::from_entries(entries)
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            sma: Sma::new(20),
            bands: BollingerBands::new(),
            rsi: Rsi::new(14),
            macd: Macd::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickwatch_core::types::Bar;

    const DAY_MS: i64 = 86_400_000;

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * DAY_MS, c, c + 1.0, c - 1.0, c, 1_000.0))
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    fn wave(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + (i as f64 * 0.05))
            .collect()
    }

    #[test]
    fn test_frame_is_aligned() {
        let series = series_from_closes(&wave(60));
        let frame = IndicatorEngine::default().compute(&series);

        assert_eq!(frame.len(), series.len());
        for (entry, bar) in frame.iter().zip(series.iter()) {
            assert_eq!(entry.timestamp, bar.timestamp);
        }
    }

    #[test]
    fn test_lookbacks() {
        let series = series_from_closes(&wave(40));
        let frame = IndicatorEngine::default().compute(&series);

        for (i, entry) in frame.iter().enumerate() {
            assert_eq!(entry.sma.is_some(), i >= 19, "sma at {}", i);
            assert_eq!(entry.upper_band.is_some(), i >= 19, "upper at {}", i);
            assert_eq!(entry.lower_band.is_some(), i >= 19, "lower at {}", i);
            assert_eq!(entry.rsi.is_some(), i >= 14, "rsi at {}", i);
            assert!(entry.macd.is_some());
            assert!(entry.macd_signal.is_some());
        }
        assert_eq!(frame.warmup_len(), 19);
    }

    #[test]
    fn test_sma_property() {
        let closes = wave(80);
        let frame = IndicatorEngine::default().compute(&series_from_closes(&closes));

        for i in 19..closes.len() {
            let expected = closes[i - 19..=i].iter().sum::<f64>() / 20.0;
            assert!((frame.get(i).unwrap().sma.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_band_width_is_four_sigma() {
        let closes = wave(80);
        let frame = IndicatorEngine::default().compute(&series_from_closes(&closes));

        for i in 19..closes.len() {
            let window = &closes[i - 19..=i];
            let mean = window.iter().sum::<f64>() / 20.0;
            let sigma =
                (window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 20.0).sqrt();

            let entry = frame.get(i).unwrap();
            let width = entry.band_width().unwrap();
            assert!(width >= 0.0);
            assert!((width - 4.0 * sigma).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rsi_bounded() {
        let frame = IndicatorEngine::default().compute(&series_from_closes(&wave(120)));
        for rsi in frame.iter().filter_map(|e| e.rsi) {
            assert!((0.0..=100.0).contains(&rsi));
        }
    }

    #[test]
    fn test_compute_is_deterministic() {
        let engine = IndicatorEngine::default();
        let series = series_from_closes(&wave(100));

        let first = engine.compute(&series);
        let second = engine.compute(&series);
        assert_eq!(first, second);

        // Bit-identical, not merely approximately equal
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.macd.map(f64::to_bits), b.macd.map(f64::to_bits));
            assert_eq!(a.rsi.map(f64::to_bits), b.rsi.map(f64::to_bits));
        }
    }

    #[test]
    fn test_prefix_values_do_not_depend_on_later_bars() {
        let engine = IndicatorEngine::default();
        let series = series_from_closes(&wave(70));

        let full = engine.compute(&series);
        let partial = engine.compute(&series.prefix(45));
        assert_eq!(partial.entries(), &full.entries()[..45]);
    }

    #[test]
    fn test_rising_series_scenario() {
        let closes: Vec<f64> = (100..125).map(|x| x as f64).collect();
        let frame = IndicatorEngine::default().compute(&series_from_closes(&closes));
        let last = frame.latest().unwrap();

        assert_eq!(last.rsi, Some(100.0));
        assert!(last.macd.unwrap() > 0.0);
        // Population sigma of 20 consecutive integers is sqrt(399/12)
        let upper = 114.5 + 2.0 * (399.0_f64 / 12.0).sqrt();
        assert!((last.upper_band.unwrap() - upper).abs() < 1e-9);
        assert!(124.0 < last.upper_band.unwrap());
    }

    #[test]
    fn test_empty_and_single_bar() {
        let engine = IndicatorEngine::default();
        assert!(engine.compute(&PriceSeries::empty("TEST")).is_empty());

        let frame = engine.compute(&series_from_closes(&[42.0]));
        let entry = frame.latest().unwrap();
        assert_eq!(entry.macd, Some(0.0));
        assert!(entry.sma.is_none());
        assert!(entry.rsi.is_none());
    }

    #[test]
    fn test_require_warm() {
        let engine = IndicatorEngine::default();
        assert_eq!(engine.warmup(), 19);

        let short = series_from_closes(&wave(10));
        assert_eq!(
            engine.require_warm(&short),
            Err(IndicatorError::InsufficientData {
                required: 20,
                available: 10
            })
        );
        assert!(engine.require_warm(&series_from_closes(&wave(20))).is_ok());
    }

    #[test]
    fn test_require_warm_reports_longest_lookback() {
        let engine = IndicatorEngine::new(&EngineConfig {
            rsi_period: 30,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            engine.require_warm(&series_from_closes(&wave(25))),
            Err(IndicatorError::InsufficientData {
                required: 31,
                available: 25
            })
        );
        assert!(engine.require_warm(&series_from_closes(&wave(31))).is_ok());
        assert!(matches!(
            engine.require_warm(&PriceSeries::empty("TEST")),
            Err(IndicatorError::InsufficientData { available: 0, .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());

        let inverted = EngineConfig {
            macd_fast: 26,
            macd_slow: 12,
            ..Default::default()
        };
        assert!(IndicatorEngine::new(&inverted).is_err());

        let tiny = EngineConfig {
            sma_period: 1,
            ..Default::default()
        };
        assert!(matches!(
            tiny.validate(),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_engine_from_default_config_matches_default() {
        let series = series_from_closes(&wave(50));
        let configured = IndicatorEngine::new(&EngineConfig::default()).unwrap();
        assert_eq!(
            configured.compute(&series),
            IndicatorEngine::default().compute(&series)
        );
    }
}
