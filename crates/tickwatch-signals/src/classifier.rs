//! Threshold classifier.

use serde::{Deserialize, Serialize};
use tickwatch_core::error::ClassifierError;
use tickwatch_core::types::{Bar, IndicatorEntry, IndicatorFrame, PriceSeries, Signal, SignalType};
use tracing::debug;

use crate::rules::{evaluate_rules, Rule, Snapshot};

/// Turns one bar and its indicator values into a signal.
///
/// Implementations are total: anything they cannot classify becomes HOLD.
pub trait Classifier: Send + Sync {
    /// Classify `bar` using the indicator entry computed for it.
    fn classify(&self, symbol: &str, bar: &Bar, entry: &IndicatorEntry) -> Signal;

    /// Get the classifier name.
    fn name(&self) -> &str;

    /// Classify the most recent bar of a series.
    ///
    /// Returns `None` only when the series or frame is empty.
    fn classify_latest(&self, series: &PriceSeries, frame: &IndicatorFrame) -> Option<Signal> {
        let bar = series.last()?;
        let entry = frame.latest()?;
        Some(self.classify(series.symbol(), bar, entry))
    }
}

/// RSI thresholds for the two rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// BUY requires RSI strictly below this
    pub buy_rsi_below: f64,
    /// SELL requires RSI strictly above this
    pub sell_rsi_above: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            buy_rsi_below: 40.0,
            sell_rsi_above: 60.0,
        }
    }
}

impl ClassifierConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        for (name, value) in [
            ("buy_rsi_below", self.buy_rsi_below),
            ("sell_rsi_above", self.sell_rsi_above),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ClassifierError::InvalidConfig(format!(
                    "{} must be between 0 and 100, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// MACD/RSI/Bollinger threshold classifier.
///
/// Rules, first match wins:
/// 1. BUY if MACD > 0, RSI < buy threshold and close <= lower band
/// 2. SELL if MACD < 0, RSI > sell threshold and close >= upper band
/// 3. HOLD otherwise
#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
    rules: [Rule; 2],
}

impl ThresholdClassifier {
    /// Create a classifier from a validated configuration.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        config.validate()?;
        Ok(Self {
            rules: [
                Rule::buy(config.buy_rsi_below),
                Rule::sell(config.sell_rsi_above),
            ],
        })
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    fn hold(symbol: &str, bar: &Bar, entry: &IndicatorEntry, reason: String) -> Signal {
        Signal {
            symbol: symbol.to_string(),
            signal_type: SignalType::Hold,
            timestamp: bar.timestamp,
            close: bar.close,
            indicators: *entry,
            reason,
        }
    }
}

impl Default for ThresholdClassifier {
    fn default() -> Self {
        let config = ClassifierConfig::default();
        Self {
            rules: [
                Rule::buy(config.buy_rsi_below),
                Rule::sell(config.sell_rsi_above),
            ],
        }
    }
}

impl Classifier for ThresholdClassifier {
    fn classify(&self, symbol: &str, bar: &Bar, entry: &IndicatorEntry) -> Signal {
        if entry.timestamp != bar.timestamp {
            return Self::hold(
                symbol,
                bar,
                entry,
                format!(
                    "indicator entry at {} does not belong to bar at {}",
                    entry.timestamp, bar.timestamp
                ),
            );
        }

        let snapshot = match Snapshot::from_entry(bar, entry) {
            Ok(snapshot) => snapshot,
            Err(missing) => {
                debug!(symbol, ?missing, "Indicators not ready, holding");
                return Self::hold(
                    symbol,
                    bar,
                    entry,
                    format!("indicators not ready: {}", missing.join(", ")),
                );
            }
        };

        match evaluate_rules(&self.rules, &snapshot) {
            Some(rule) => Signal {
                symbol: symbol.to_string(),
                signal_type: rule.signal,
                timestamp: bar.timestamp,
                close: bar.close,
                indicators: *entry,
                reason: format!(
                    "{} (MACD {:.4}, RSI {:.2}, close {:.2}, bands {:.2}..{:.2})",
                    rule,
                    snapshot.macd,
                    snapshot.rsi,
                    snapshot.close,
                    snapshot.lower_band,
                    snapshot.upper_band
                ),
            },
            None => Self::hold(symbol, bar, entry, "no rule matched".to_string()),
        }
    }

    fn name(&self) -> &str {
        "MACD/RSI/Bollinger thresholds"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickwatch_indicators::IndicatorEngine;

    const DAY_MS: i64 = 86_400_000;

    fn bar(close: f64) -> Bar {
        Bar::new(DAY_MS, close, close + 1.0, close - 1.0, close, 5_000.0)
    }

    fn entry(macd: f64, rsi: f64, lower: f64, upper: f64) -> IndicatorEntry {
        IndicatorEntry {
            timestamp: DAY_MS,
            sma: Some((lower + upper) / 2.0),
            upper_band: Some(upper),
            lower_band: Some(lower),
            rsi: Some(rsi),
            macd: Some(macd),
            macd_signal: Some(0.0),
        }
    }

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * DAY_MS, c, c + 1.0, c - 1.0, c, 1_000.0))
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn test_buy() {
        let classifier = ThresholdClassifier::default();
        let signal = classifier.classify("AAPL", &bar(95.0), &entry(0.5, 30.0, 96.0, 110.0));

        assert_eq!(signal.signal_type, SignalType::Buy);
        assert_eq!(signal.symbol, "AAPL");
        assert_eq!(signal.timestamp, DAY_MS);
        assert_eq!(signal.close, 95.0);
        assert!(signal.reason.starts_with("MACD > 0"));
    }

    #[test]
    fn test_sell() {
        let classifier = ThresholdClassifier::default();
        let signal = classifier.classify("AAPL", &bar(112.0), &entry(-0.5, 75.0, 96.0, 110.0));
        assert_eq!(signal.signal_type, SignalType::Sell);
    }

    #[test]
    fn test_hold_when_conditions_disagree() {
        let classifier = ThresholdClassifier::default();
        // Oversold and under the band, but MACD is negative
        let signal = classifier.classify("AAPL", &bar(95.0), &entry(-0.5, 30.0, 96.0, 110.0));

        assert_eq!(signal.signal_type, SignalType::Hold);
        assert_eq!(signal.reason, "no rule matched");
    }

    #[test]
    fn test_hold_when_indicators_missing() {
        let classifier = ThresholdClassifier::default();
        let signal = classifier.classify("AAPL", &bar(95.0), &IndicatorEntry::undefined(DAY_MS));

        assert_eq!(signal.signal_type, SignalType::Hold);
        assert!(signal.reason.starts_with("indicators not ready"));
    }

    #[test]
    fn test_hold_on_nan() {
        let classifier = ThresholdClassifier::default();
        let mut values = entry(0.5, 30.0, 96.0, 110.0);
        values.lower_band = Some(f64::NAN);

        let signal = classifier.classify("AAPL", &bar(95.0), &values);
        assert_eq!(signal.signal_type, SignalType::Hold);
    }

    #[test]
    fn test_hold_on_misaligned_entry() {
        let classifier = ThresholdClassifier::default();
        let mut values = entry(0.5, 30.0, 96.0, 110.0);
        values.timestamp = 0;

        let signal = classifier.classify("AAPL", &bar(95.0), &values);
        assert_eq!(signal.signal_type, SignalType::Hold);
    }

    #[test]
    fn test_buy_rule_is_evaluated_first() {
        let classifier = ThresholdClassifier::default();
        assert_eq!(classifier.rules()[0].signal, SignalType::Buy);
        assert_eq!(classifier.rules()[1].signal, SignalType::Sell);
    }

    #[test]
    fn test_deterministic() {
        let classifier = ThresholdClassifier::default();
        let values = entry(0.5, 30.0, 96.0, 110.0);

        let first = classifier.classify("AAPL", &bar(95.0), &values);
        let second = classifier.classify("AAPL", &bar(95.0), &values);
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = ClassifierConfig {
            buy_rsi_below: 25.0,
            sell_rsi_above: 75.0,
        };
        let classifier = ThresholdClassifier::new(&config).unwrap();

        let signal = classifier.classify("AAPL", &bar(95.0), &entry(0.5, 30.0, 96.0, 110.0));
        assert_eq!(signal.signal_type, SignalType::Hold);
    }

    #[test]
    fn test_invalid_config() {
        let config = ClassifierConfig {
            buy_rsi_below: 140.0,
            ..Default::default()
        };
        assert!(matches!(
            ThresholdClassifier::new(&config),
            Err(ClassifierError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rising_series_never_buys() {
        let engine = IndicatorEngine::default();
        let classifier = ThresholdClassifier::default();

        let closes: Vec<f64> = (100..125).map(|x| x as f64).collect();
        let series = series_from_closes(&closes);
        let frame = engine.compute(&series);

        let signal = classifier.classify_latest(&series, &frame).unwrap();
        // RSI is 100 and the close stays inside the upper band
        assert_eq!(signal.indicators.rsi, Some(100.0));
        assert_eq!(signal.signal_type, SignalType::Hold);

        for len in 1..=closes.len() {
            let prefix = series.prefix(len);
            let signal = classifier
                .classify_latest(&prefix, &engine.compute(&prefix))
                .unwrap();
            assert_ne!(signal.signal_type, SignalType::Buy);
        }
    }

    #[test]
    fn test_short_series_always_holds() {
        let engine = IndicatorEngine::default();
        let classifier = ThresholdClassifier::default();

        // Sharp swings that would otherwise trip a rule
        let closes = [100.0, 80.0, 120.0, 70.0, 130.0, 60.0, 140.0, 50.0, 150.0, 40.0, 160.0, 30.0, 170.0];
        let series = series_from_closes(&closes);

        for len in 1..=closes.len() {
            let prefix = series.prefix(len);
            let signal = classifier
                .classify_latest(&prefix, &engine.compute(&prefix))
                .unwrap();
            assert_eq!(signal.signal_type, SignalType::Hold, "tick {}", len);
        }
    }

    #[test]
    fn test_classify_latest_empty() {
        let classifier = ThresholdClassifier::default();
        let series = PriceSeries::empty("AAPL");
        assert!(classifier
            .classify_latest(&series, &IndicatorFrame::default())
            .is_none());
    }
}
