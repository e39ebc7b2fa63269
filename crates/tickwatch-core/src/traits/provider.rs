//! Price provider trait definition.

use crate::error::DataError;
use crate::types::{Bar, Timeframe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of OHLCV bars for a ticker.
///
/// Implementations own all network I/O, including retries and timeouts.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch historical bars.
    ///
    /// # Arguments
    /// * `symbol` - The symbol to fetch
    /// * `timeframe` - The bar timeframe
    /// * `start` - Start of the date range
    /// * `end` - End of the date range
    ///
    /// # Returns
    /// Bars ordered from oldest to newest
    async fn get_historical_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError>;

    /// Fetch the most recent bars, including a still-forming session bar.
    ///
    /// Returns an empty vector when the source has nothing new.
    async fn get_latest_bars(&self, symbol: &str, timeframe: Timeframe)
        -> Result<Vec<Bar>, DataError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}
