//! Ordered threshold rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use tickwatch_core::types::{Bar, IndicatorEntry, SignalType};

/// Fully defined inputs for rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub close: f64,
    pub macd: f64,
    pub rsi: f64,
    pub upper_band: f64,
    pub lower_band: f64,
}

impl Snapshot {
    /// Collect the values the rules read.
    ///
    /// Returns the names of the missing values when any of them is absent or
    /// not a finite number.
    pub fn from_entry(bar: &Bar, entry: &IndicatorEntry) -> Result<Self, Vec<&'static str>> {
        let fields = [
            ("close", Some(bar.close)),
            ("macd", entry.macd),
            ("rsi", entry.rsi),
            ("upper_band", entry.upper_band),
            ("lower_band", entry.lower_band),
        ];

        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, v)| !v.is_some_and(f64::is_finite))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(Self {
            close: bar.close,
            macd: entry.macd.unwrap_or_default(),
            rsi: entry.rsi.unwrap_or_default(),
            upper_band: entry.upper_band.unwrap_or_default(),
            lower_band: entry.lower_band.unwrap_or_default(),
        })
    }
}

/// Required sign of the MACD line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Trend {
    /// MACD > 0
    Positive,
    /// MACD < 0
    Negative,
}

/// Strict RSI threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RsiBound {
    Below(f64),
    Above(f64),
}

/// Required position of the close relative to the bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BandTouch {
    /// close <= lower band
    AtOrBelowLower,
    /// close >= upper band
    AtOrAboveUpper,
}

/// One classification rule: all three conditions must hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub signal: SignalType,
    pub trend: Trend,
    pub rsi: RsiBound,
    pub band: BandTouch,
}

impl Rule {
    /// BUY on positive MACD, RSI under `rsi_below`, close at or under the lower band.
    pub fn buy(rsi_below: f64) -> Self {
        Self {
            signal: SignalType::Buy,
            trend: Trend::Positive,
            rsi: RsiBound::Below(rsi_below),
            band: BandTouch::AtOrBelowLower,
        }
    }

    /// SELL on negative MACD, RSI over `rsi_above`, close at or over the upper band.
    pub fn sell(rsi_above: f64) -> Self {
        Self {
            signal: SignalType::Sell,
            trend: Trend::Negative,
            rsi: RsiBound::Above(rsi_above),
            band: BandTouch::AtOrAboveUpper,
        }
    }

    pub fn matches(&self, s: &Snapshot) -> bool {
        let trend = match self.trend {
            Trend::Positive => s.macd > 0.0,
            Trend::Negative => s.macd < 0.0,
        };
        let rsi = match self.rsi {
            RsiBound::Below(limit) => s.rsi < limit,
            RsiBound::Above(limit) => s.rsi > limit,
        };
        let band = match self.band {
            BandTouch::AtOrBelowLower => s.close <= s.lower_band,
            BandTouch::AtOrAboveUpper => s.close >= s.upper_band,
        };
        trend && rsi && band
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trend = match self.trend {
            Trend::Positive => "MACD > 0",
            Trend::Negative => "MACD < 0",
        };
        let band = match self.band {
            BandTouch::AtOrBelowLower => "close <= lower band",
            BandTouch::AtOrAboveUpper => "close >= upper band",
        };
        match self.rsi {
            RsiBound::Below(limit) => write!(f, "{}, RSI < {}, {}", trend, limit, band),
            RsiBound::Above(limit) => write!(f, "{}, RSI > {}, {}", trend, limit, band),
        }
    }
}

/// First rule matching `snapshot`, in list order.
pub fn evaluate_rules<'a>(rules: &'a [Rule], snapshot: &Snapshot) -> Option<&'a Rule> {
    rules.iter().find(|rule| rule.matches(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(close: f64, macd: f64, rsi: f64) -> Snapshot {
        Snapshot {
            close,
            macd,
            rsi,
            upper_band: 110.0,
            lower_band: 90.0,
        }
    }

    #[test]
    fn test_buy_rule_boundaries() {
        let rule = Rule::buy(40.0);

        assert!(rule.matches(&snapshot(90.0, 0.1, 39.9))); // close == lower band
        assert!(rule.matches(&snapshot(85.0, 0.1, 20.0)));
        assert!(!rule.matches(&snapshot(90.0, 0.0, 30.0))); // MACD must be strictly positive
        assert!(!rule.matches(&snapshot(90.0, 0.1, 40.0))); // RSI must be strictly below
        assert!(!rule.matches(&snapshot(90.01, 0.1, 30.0)));
    }

    #[test]
    fn test_sell_rule_boundaries() {
        let rule = Rule::sell(60.0);

        assert!(rule.matches(&snapshot(110.0, -0.1, 60.1))); // close == upper band
        assert!(!rule.matches(&snapshot(110.0, 0.0, 70.0)));
        assert!(!rule.matches(&snapshot(110.0, -0.1, 60.0)));
        assert!(!rule.matches(&snapshot(109.99, -0.1, 70.0)));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // Two rules that both accept the same snapshot: list order decides.
        let permissive_sell = Rule {
            signal: SignalType::Sell,
            trend: Trend::Positive,
            rsi: RsiBound::Below(100.0),
            band: BandTouch::AtOrBelowLower,
        };
        let s = snapshot(80.0, 1.0, 10.0);

        let rules = [Rule::buy(40.0), permissive_sell];
        assert!(rules.iter().all(|r| r.matches(&s)));
        assert_eq!(evaluate_rules(&rules, &s).unwrap().signal, SignalType::Buy);

        let reversed = [permissive_sell, Rule::buy(40.0)];
        assert_eq!(evaluate_rules(&reversed, &s).unwrap().signal, SignalType::Sell);
    }

    #[test]
    fn test_no_rule_matches() {
        let rules = [Rule::buy(40.0), Rule::sell(60.0)];
        assert!(evaluate_rules(&rules, &snapshot(100.0, 0.5, 50.0)).is_none());
        assert!(evaluate_rules(&[], &snapshot(100.0, 0.5, 50.0)).is_none());
    }

    #[test]
    fn test_snapshot_reports_missing_values() {
        let bar = Bar::new(1, 100.0, 101.0, 99.0, 100.0, 10.0);
        let entry = IndicatorEntry {
            timestamp: 1,
            macd: Some(0.2),
            rsi: Some(f64::NAN),
            ..Default::default()
        };

        let missing = Snapshot::from_entry(&bar, &entry).unwrap_err();
        assert_eq!(missing, vec!["rsi", "upper_band", "lower_band"]);
    }

    #[test]
    fn test_rule_display() {
        assert_eq!(
            Rule::buy(40.0).to_string(),
            "MACD > 0, RSI < 40, close <= lower band"
        );
    }
}
