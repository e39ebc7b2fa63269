//! Price providers.
//!
//! - [`YahooProvider`]: Yahoo Finance v8 chart API over HTTP, with retries
//! - [`CsvDataSource`]: OHLCV bars from a CSV export
//! - [`ReplayProvider`]: serves recorded bars one tick at a time

mod csv_source;
mod replay;
mod yahoo;

pub use csv_source::CsvDataSource;
pub use replay::ReplayProvider;
pub use yahoo::{YahooConfig, YahooProvider};

use std::path::Path;
use tickwatch_core::error::DataError;
use tickwatch_core::types::PriceSeries;

/// Load a CSV file as a price series.
pub fn load_csv(path: &Path, symbol: &str) -> Result<PriceSeries, DataError> {
    let source = CsvDataSource::new(path)?;
    let bars = source.load_all()?;
    Ok(PriceSeries::from_unsorted(symbol, bars)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv_sorts_and_keeps_last_duplicate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
        writeln!(file, "2024-01-03,10,11,9,10.5,1000").unwrap();
        writeln!(file, "2024-01-02,10,11,9,10.2,1000").unwrap();
        writeln!(file, "2024-01-03,10,11,9,10.8,1200").unwrap();
        file.flush().unwrap();

        let series = load_csv(file.path(), "TEST").unwrap();
        assert_eq!(series.symbol(), "TEST");
        assert_eq!(series.closes(), vec![10.2, 10.8]);
    }

    #[test]
    fn test_load_csv_rejects_malformed_bar() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
        writeln!(file, "2024-01-02,10,11,0,10.2,1000").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            load_csv(file.path(), "TEST"),
            Err(DataError::Series(_))
        ));
    }
}
