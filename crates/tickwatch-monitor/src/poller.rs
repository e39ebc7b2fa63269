//! Timed fetch, merge, recompute and classify loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tickwatch_core::error::{DataError, TickwatchError};
use tickwatch_core::traits::PriceProvider;
use tickwatch_core::types::{IndicatorFrame, PriceSeries, Signal, Timeframe};
use tickwatch_core::TickwatchResult;
use tickwatch_indicators::IndicatorEngine;
use tickwatch_signals::Classifier;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Polling settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    pub timeframe: Timeframe,
    /// Stop after this many ticks; `None` runs until shutdown
    pub max_ticks: Option<u64>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            timeframe: Timeframe::Daily,
            max_ticks: None,
        }
    }
}

/// Outcome of a finished polling run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub ticks: u64,
    pub failures: u64,
    pub last_signal: Option<Signal>,
}

/// Owns the live series and re-evaluates it on every tick.
pub struct Poller {
    provider: Arc<dyn PriceProvider>,
    engine: IndicatorEngine,
    classifier: Box<dyn Classifier>,
    series: PriceSeries,
    frame: IndicatorFrame,
    config: PollerConfig,
}

impl Poller {
    /// Create a poller starting from an already loaded history.
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        engine: IndicatorEngine,
        classifier: Box<dyn Classifier>,
        series: PriceSeries,
        config: PollerConfig,
    ) -> Self {
        let frame = engine.compute(&series);
        Self {
            provider,
            engine,
            classifier,
            series,
            frame,
            config,
        }
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn frame(&self) -> &IndicatorFrame {
        &self.frame
    }

    /// Classification of the current series without fetching.
    pub fn current_signal(&self) -> Option<Signal> {
        self.classifier.classify_latest(&self.series, &self.frame)
    }

    /// Fetch the latest bars, merge them in, recompute and classify.
    ///
    /// A failed fetch or a malformed incoming bar leaves the series as it was.
    pub async fn tick(&mut self) -> TickwatchResult<Signal> {
        let symbol = self.series.symbol().to_string();
        let incoming = self
            .provider
            .get_latest_bars(&symbol, self.config.timeframe)
            .await?;

        if !incoming.is_empty() {
            let before = self.series.len();
            self.series = self.series.merge(&incoming)?;
            debug!(
                symbol = %symbol,
                fetched = incoming.len(),
                added = self.series.len() - before,
                "Merged latest bars"
            );
        }

        self.frame = self.engine.compute(&self.series);
        self.current_signal()
            .ok_or(TickwatchError::Data(DataError::NoDataAvailable))
    }

    /// Poll until Ctrl+C or until `max_ticks` ticks have run.
    pub async fn run<F>(&mut self, on_signal: F) -> RunSummary
    where
        F: FnMut(&Signal),
    {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Ctrl+C handler unavailable");
                std::future::pending::<()>().await;
            }
        };
        self.run_until(ctrl_c, on_signal).await
    }

    /// Poll until `shutdown` completes or until `max_ticks` ticks have run.
    ///
    /// The first tick fires immediately. Tick errors are logged and counted;
    /// the loop carries on with the next tick.
    pub async fn run_until<S, F>(&mut self, shutdown: S, mut on_signal: F) -> RunSummary
    where
        S: Future<Output = ()>,
        F: FnMut(&Signal),
    {
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut summary = RunSummary::default();
        info!(
            symbol = %self.series.symbol(),
            provider = self.provider.name(),
            interval_secs = self.config.interval.as_secs_f64(),
            "Starting live monitoring"
        );

        loop {
            if self.config.max_ticks.is_some_and(|max| summary.ticks >= max) {
                break;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = interval.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                result = self.tick() => result,
            };

            summary.ticks += 1;
            match result {
                Ok(signal) => {
                    on_signal(&signal);
                    summary.last_signal = Some(signal);
                }
                Err(e) => {
                    summary.failures += 1;
                    error!(symbol = %self.series.symbol(), error = %e, "Monitoring error");
                }
            }
        }

        info!(ticks = summary.ticks, failures = summary.failures, "Monitoring stopped");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tickwatch_core::types::{Bar, SignalType};
    use tickwatch_signals::ThresholdClassifier;

    const DAY: i64 = 86_400_000;

    /// Returns scripted responses, one per poll, then empty batches.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<Vec<Bar>, DataError>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<Vec<Bar>, DataError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
            })
        }
    }

    #[async_trait]
    impl PriceProvider for ScriptedProvider {
        async fn get_historical_bars(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<Bar>, DataError> {
            Err(DataError::NoDataAvailable)
        }

        async fn get_latest_bars(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
        ) -> Result<Vec<Bar>, DataError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn bar(day: i64, close: f64) -> Bar {
        Bar::new(day * DAY, close, close + 1.0, close - 1.0, close, 1_000.0)
    }

    fn history(days: i64) -> PriceSeries {
        let bars = (0..days).map(|d| bar(d, 100.0 + d as f64)).collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    fn poller(provider: Arc<ScriptedProvider>, series: PriceSeries, max_ticks: u64) -> Poller {
        Poller::new(
            provider,
            IndicatorEngine::default(),
            Box::new(ThresholdClassifier::default()),
            series,
            PollerConfig {
                interval: Duration::from_millis(1),
                timeframe: Timeframe::Daily,
                max_ticks: Some(max_ticks),
            },
        )
    }

    #[tokio::test]
    async fn test_tick_merges_and_replaces_latest_bar() {
        let provider = ScriptedProvider::new(vec![Ok(vec![bar(29, 150.0), bar(30, 151.0)])]);
        let mut poller = poller(provider, history(30), 1);

        let signal = poller.tick().await.unwrap();

        assert_eq!(poller.series().len(), 31);
        assert_eq!(poller.series().bars()[29].close, 150.0);
        assert_eq!(poller.frame().len(), 31);
        assert_eq!(signal.timestamp, 30 * DAY);
        assert_eq!(signal.close, 151.0);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_series() {
        let provider = ScriptedProvider::new(vec![Err(DataError::ConnectionError(
            "unreachable".to_string(),
        ))]);
        let mut poller = poller(provider, history(30), 1);

        assert!(poller.tick().await.is_err());
        assert_eq!(poller.series().len(), 30);
    }

    #[tokio::test]
    async fn test_malformed_bar_is_rejected() {
        let provider = ScriptedProvider::new(vec![Ok(vec![bar(30, f64::NAN)])]);
        let mut poller = poller(provider, history(30), 1);

        let err = poller.tick().await.unwrap_err();
        assert!(matches!(err, TickwatchError::Series(_)));
        assert_eq!(poller.series().len(), 30);
    }

    #[tokio::test]
    async fn test_run_continues_after_errors() {
        let provider = ScriptedProvider::new(vec![
            Ok(vec![bar(30, 131.0)]),
            Err(DataError::RateLimited { retry_after_secs: 1 }),
            Ok(vec![bar(31, 132.0)]),
        ]);
        let mut poller = poller(provider, history(30), 3);

        let mut seen = Vec::new();
        let summary = poller
            .run_until(std::future::pending(), |s| seen.push(s.timestamp))
            .await;

        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.failures, 1);
        assert_eq!(seen, vec![30 * DAY, 31 * DAY]);
        assert_eq!(poller.series().len(), 32);
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let provider = ScriptedProvider::new(Vec::new());
        let mut poller = poller(provider, history(30), u64::MAX);

        let summary = poller.run_until(async {}, |_| {}).await;
        assert_eq!(summary.ticks, 0);
        assert!(summary.last_signal.is_none());
    }

    #[tokio::test]
    async fn test_short_history_holds_every_tick() {
        let provider = ScriptedProvider::new(vec![
            Ok(vec![bar(5, 90.0)]),
            Ok(vec![bar(6, 80.0)]),
            Ok(vec![bar(7, 70.0)]),
        ]);
        let mut poller = poller(provider, history(5), 3);

        let mut signals = Vec::new();
        poller
            .run_until(std::future::pending(), |s| signals.push(s.signal_type))
            .await;

        assert_eq!(signals, vec![SignalType::Hold; 3]);
    }

    #[tokio::test]
    async fn test_empty_series_without_bars_is_an_error() {
        let provider = ScriptedProvider::new(Vec::new());
        let mut poller = poller(provider, PriceSeries::empty("TEST"), 1);

        let err = poller.tick().await.unwrap_err();
        assert!(matches!(err, TickwatchError::Data(DataError::NoDataAvailable)));
    }
}
