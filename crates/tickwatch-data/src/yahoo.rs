//! Yahoo Finance v8 chart API provider.
//!
//! The endpoint is unofficial and unauthenticated. Requests are retried with
//! exponential backoff on rate limiting, server errors and transport
//! failures; unknown symbols fail immediately.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tickwatch_core::error::DataError;
use tickwatch_core::traits::PriceProvider;
use tickwatch_core::types::{Bar, Timeframe};
use tracing::{debug, info, warn};

const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// HTTP settings for [`YahooProvider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_ms: u64,
    pub user_agent: String,
    /// Days requested on every "latest bars" poll.
    pub latest_range_days: u32,
    /// Replace the raw close with the split/dividend adjusted close.
    pub use_adjusted_close: bool,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_base_ms: 500,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
            latest_range_days: 2,
            use_adjusted_close: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Time window of a chart request.
#[derive(Debug, Clone, Copy)]
enum Span {
    Between(DateTime<Utc>, DateTime<Utc>),
    RecentDays(u32),
}

/// Yahoo Finance price provider.
pub struct YahooProvider {
    client: Client,
    config: YahooConfig,
}

impl YahooProvider {
    pub fn new(config: YahooConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DataError::Internal(format!("failed to build HTTP client: {e}")))?;

        info!(base_url = %config.base_url, "Yahoo provider initialized");
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    fn chart_url(&self, symbol: &str, timeframe: Timeframe, span: Span) -> String {
        let window = match span {
            Span::Between(start, end) => format!(
                "period1={}&period2={}",
                start.timestamp(),
                end.timestamp()
            ),
            Span::RecentDays(days) => format!("range={days}d"),
        };
        format!(
            "{}/v8/finance/chart/{}?{}&interval={}&includeAdjustedClose=true",
            self.config.base_url.trim_end_matches('/'),
            symbol,
            window,
            timeframe.api_code()
        )
    }

    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        span: Span,
    ) -> Result<Vec<Bar>, DataError> {
        let url = self.chart_url(symbol, timeframe, span);
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.config.retry_base_ms, attempt);
                debug!(symbol, attempt, ?delay, "Retrying chart request");
                tokio::time::sleep(delay).await;
            }

            let resp = match self.client.get(&url).send().await {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    warn!(symbol, attempt, error = %e, "Chart request failed");
                    last_error = Some(DataError::ConnectionError(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::ConnectionError(e.to_string())),
            };

            let status = resp.status();
            if status == StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound(symbol.to_string()));
            }
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!(symbol, attempt, retry_after_secs, "Rate limited by Yahoo");
                last_error = Some(DataError::RateLimited { retry_after_secs });
                continue;
            }
            if status.is_server_error() {
                warn!(symbol, attempt, %status, "Yahoo server error");
                last_error = Some(DataError::ConnectionError(format!("HTTP {status}")));
                continue;
            }
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                return Err(DataError::Internal(format!("HTTP {status}: {text}")));
            }

            let chart: ChartResponse = resp.json().await.map_err(|e| {
                DataError::ParseError(format!("chart response for {symbol}: {e}"))
            })?;
            let bars = parse_response(symbol, chart, timeframe, self.config.use_adjusted_close)?;
            debug!(symbol, bars = bars.len(), "Fetched chart");
            return Ok(bars);
        }

        Err(last_error
            .unwrap_or_else(|| DataError::ConnectionError("max retries exceeded".to_string())))
    }
}

/// Delay before retry `attempt` (1-based): base doubled per attempt, capped.
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(base_ms.saturating_mul(factor).min(MAX_RETRY_DELAY_MS))
}

/// Convert a chart response into bars.
///
/// Sessions with any missing price are skipped and a missing volume reads as
/// zero. Daily and longer bars are stamped at midnight UTC of their exchange
/// date so that repeated fetches of the same session collide on timestamp.
fn parse_response(
    symbol: &str,
    resp: ChartResponse,
    timeframe: Timeframe,
    use_adjusted_close: bool,
) -> Result<Vec<Bar>, DataError> {
    let result = match (resp.chart.result, resp.chart.error) {
        (Some(result), _) => result,
        (None, Some(err)) if err.code == "Not Found" => {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }
        (None, Some(err)) => {
            return Err(DataError::ParseError(format!("{}: {}", err.code, err.description)));
        }
        (None, None) => {
            return Err(DataError::ParseError("empty result with no error".to_string()));
        }
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ParseError("result array is empty".to_string()))?;
    let Some(timestamps) = data.timestamp else {
        return Err(DataError::NoDataAvailable);
    };
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ParseError("no quote data".to_string()))?;
    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let offset = data.meta.gmtoffset;
    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let field = |v: &[Option<f64>]| v.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(raw_close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            continue;
        };

        let adjusted = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());
        let close = match adjusted {
            Some(adj) if use_adjusted_close => adj,
            _ => raw_close,
        };
        let volume = field(&quote.volume).unwrap_or(0.0);

        let timestamp = if timeframe.is_intraday() {
            ts * 1000
        } else {
            session_date_millis(ts, offset)?
        };
        bars.push(Bar::new(timestamp, open, high, low, close, volume));
    }

    if bars.is_empty() {
        return Err(DataError::NoDataAvailable);
    }
    Ok(bars)
}

fn session_date_millis(ts: i64, gmtoffset: i64) -> Result<i64, DataError> {
    DateTime::from_timestamp(ts + gmtoffset, 0)
        .map(|dt| dt.date_naive().and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis())
        .ok_or_else(|| DataError::ParseError(format!("invalid timestamp: {ts}")))
}

#[async_trait]
impl PriceProvider for YahooProvider {
    async fn get_historical_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        if start >= end {
            return Err(DataError::NoDataAvailable);
        }
        self.fetch(symbol, timeframe, Span::Between(start, end)).await
    }

    async fn get_latest_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Bar>, DataError> {
        self.fetch(symbol, timeframe, Span::RecentDays(self.config.latest_range_days))
            .await
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
