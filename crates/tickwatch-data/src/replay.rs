//! Replays recorded bars as if they were arriving live.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use tickwatch_core::error::DataError;
use tickwatch_core::traits::PriceProvider;
use tickwatch_core::types::{Bar, Timeframe};
use tracing::debug;

/// Serves a fixed set of bars, revealing one more on every poll.
///
/// History requests only see bars that have already been revealed, so a
/// replayed session never looks ahead of its own clock.
#[derive(Debug)]
pub struct ReplayProvider {
    bars: Vec<Bar>,
    revealed: AtomicUsize,
}

impl ReplayProvider {
    /// Replay `bars` with the first `initial` already visible.
    pub fn new(mut bars: Vec<Bar>, initial: usize) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        let initial = initial.min(bars.len());
        Self {
            bars,
            revealed: AtomicUsize::new(initial),
        }
    }

    /// Number of bars revealed so far.
    pub fn revealed(&self) -> usize {
        self.revealed.load(Ordering::SeqCst)
    }

    /// True once every bar has been served.
    pub fn is_exhausted(&self) -> bool {
        self.revealed() >= self.bars.len()
    }
}

#[async_trait]
impl PriceProvider for ReplayProvider {
    async fn get_historical_bars(
        &self,
        _symbol: &str,
        _timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let (start, end) = (start.timestamp_millis(), end.timestamp_millis());
        let bars: Vec<Bar> = self.bars[..self.revealed()]
            .iter()
            .filter(|b| b.timestamp >= start && b.timestamp <= end)
            .copied()
            .collect();

        if bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(bars)
    }

    async fn get_latest_bars(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<Vec<Bar>, DataError> {
        let total = self.bars.len();
        let next = self
            .revealed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < total).then_some(n + 1)
            });

        match next {
            Ok(index) => {
                debug!(symbol, index, "Replaying bar");
                Ok(vec![self.bars[index]])
            }
            Err(_) => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "replay"
    }
}
