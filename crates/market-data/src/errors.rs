//! Error types for the market data crate.
//!
//! These errors surface only inside providers and the page-fetch seam;
//! the [`QuoteResolver`](crate::resolver::QuoteResolver) boundary is
//! infallible and degrades every failure to fallback values.

use thiserror::Error;

/// Errors that can occur while talking to a market data source.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A provider-specific failure: non-success HTTP status, missing data,
    /// or anything else the source did wrong.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider's payload could not be parsed.
    #[error("Parse failed: {provider} - {message}")]
    ParseFailed {
        /// The provider whose payload failed to parse
        provider: String,
        /// Description of the parse failure
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
