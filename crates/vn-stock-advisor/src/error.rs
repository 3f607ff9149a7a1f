//! Error types for stock analysis operations

use thiserror::Error;

/// Minimum number of bars the engine accepts
pub const MIN_BARS: usize = 5;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Too few bars to compute anything meaningful
    #[error("Insufficient data: {bars} bars supplied, at least {required} required")]
    InsufficientData { bars: usize, required: usize },

    /// Required fields absent from the input records
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A record field is present but unusable
    #[error("Invalid value in record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StockError {
    /// Errors caused by the shape of the input rather than by a provider
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            StockError::InsufficientData { .. }
                | StockError::MissingColumns(_)
                | StockError::InvalidRecord { .. }
        )
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Convert StockError to agent_core::Error
impl From<StockError> for agent_core::Error {
    fn from(err: StockError) -> Self {
        agent_core::Error::ProcessingFailed(err.to_string())
    }
}

/// Convert agent_core::Error to StockError
impl From<agent_core::Error> for StockError {
    fn from(err: agent_core::Error) -> Self {
        StockError::Other(err.to_string())
    }
}
