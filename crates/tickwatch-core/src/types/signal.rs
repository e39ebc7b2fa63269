//! Trading signal types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::IndicatorEntry;

/// Discrete classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl SignalType {
    /// True for BUY or SELL.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, SignalType::Hold)
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::Hold => "HOLD",
        };
        write!(f, "{}", s)
    }
}

/// One classification of the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Symbol the signal is for
    pub symbol: String,
    /// BUY, SELL or HOLD
    pub signal_type: SignalType,
    /// Timestamp of the evaluated bar (Unix milliseconds)
    pub timestamp: i64,
    /// Close of the evaluated bar
    pub close: f64,
    /// Indicator values the decision was made from
    pub indicators: IndicatorEntry,
    /// Which rule fired, or why none did
    pub reason: String,
}

impl Signal {
    /// Timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }
}
