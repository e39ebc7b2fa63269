//! Operator console output.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tickwatch_core::types::{Signal, SignalType};

const LINE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How signals are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (expected text or json)")),
        }
    }
}

/// `[YYYY-MM-DD HH:MM:SS] TICKER Signal: BUY`
pub fn signal_line(symbol: &str, signal_type: SignalType, at: NaiveDateTime) -> String {
    format!("[{}] {} Signal: {}", at.format(LINE_TIME_FORMAT), symbol, signal_type)
}

#[derive(Serialize)]
struct SignalRecord<'a> {
    printed_at: String,
    #[serde(flatten)]
    signal: &'a Signal,
}

/// The signal as a single JSON object, stamped with the print time.
pub fn signal_json(signal: &Signal, at: NaiveDateTime) -> serde_json::Result<String> {
    serde_json::to_string(&SignalRecord {
        printed_at: at.format(LINE_TIME_FORMAT).to_string(),
        signal,
    })
}

/// Multi-line description of a signal and the values behind it.
pub fn summary(signal: &Signal) -> String {
    let ind = &signal.indicators;
    let value = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |x| format!("{x:.2}"));

    [
        format!("{} {} as of {}", signal.symbol, signal.signal_type, signal.datetime().date_naive()),
        format!("  close        {:.2}", signal.close),
        format!("  sma          {}", value(ind.sma)),
        format!("  bands        {} / {}", value(ind.lower_band), value(ind.upper_band)),
        format!("  rsi          {}", value(ind.rsi)),
        format!("  macd         {} (signal {})", value(ind.macd), value(ind.macd_signal)),
        format!("  reason       {}", signal.reason),
    ]
    .join("\n")
}

/// Writes one record per signal to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrinter {
    format: OutputFormat,
}

impl ConsolePrinter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a signal the way [`print`](Self::print) would at time `at`.
    pub fn render(&self, signal: &Signal, at: NaiveDateTime) -> String {
        match self.format {
            OutputFormat::Text => signal_line(&signal.symbol, signal.signal_type, at),
            OutputFormat::Json => signal_json(signal, at).unwrap_or_else(|e| {
                format!("{{\"error\":\"failed to serialize signal: {e}\"}}")
            }),
        }
    }

    pub fn print(&self, signal: &Signal) {
        println!("{}", self.render(signal, Local::now().naive_local()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tickwatch_core::types::IndicatorEntry;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 7, 3)
            .unwrap()
    }

    fn signal(signal_type: SignalType) -> Signal {
        let mut indicators = IndicatorEntry::undefined(1_709_596_800_000);
        indicators.rsi = Some(35.5);
        Signal {
            symbol: "AAPL".to_string(),
            signal_type,
            timestamp: 1_709_596_800_000,
            close: 170.12,
            indicators,
            reason: "no rule matched".to_string(),
        }
    }

    #[test]
    fn test_signal_line_format() {
        assert_eq!(
            signal_line("AAPL", SignalType::Buy, at()),
            "[2024-03-05 09:07:03] AAPL Signal: BUY"
        );
    }

    #[test]
    fn test_json_record() {
        let json = signal_json(&signal(SignalType::Sell), at()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["printed_at"], "2024-03-05 09:07:03");
        assert_eq!(value["signal_type"], "SELL");
        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["indicators"]["rsi"], 35.5);
    }

    #[test]
    fn test_printer_render_text() {
        let printer = ConsolePrinter::new(OutputFormat::Text);
        assert_eq!(
            printer.render(&signal(SignalType::Hold), at()),
            "[2024-03-05 09:07:03] AAPL Signal: HOLD"
        );
    }

    #[test]
    fn test_summary_marks_missing_values() {
        let text = summary(&signal(SignalType::Hold));
        assert!(text.starts_with("AAPL HOLD as of 2024-03-05"));
        assert!(text.contains("rsi          35.50"));
        assert!(text.contains("sma          n/a"));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
