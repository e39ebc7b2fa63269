//! Error types for the indicator monitor.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum TickwatchError {
    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Price series construction errors.
///
/// A series that fails these checks is rejected as a whole.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("Malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },

    #[error("Bars out of order at index {index}: {timestamp} is not after {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: i64,
        previous: i64,
    },

    #[error("Duplicate timestamp {timestamp} at index {index}")]
    DuplicateTimestamp { index: usize, timestamp: i64 },
}

/// Data source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Malformed series: {0}")]
    Series(#[from] SeriesError),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Signal classifier errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias.
pub type TickwatchResult<T> = Result<T, TickwatchError>;
