use thiserror::Error;

use folioscope_market_data::MarketDataError;

// Type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the portfolio core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read holdings source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse holdings source: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),
}
