//! Shared page fetching seam.
//!
//! Providers talk to the outside world exclusively through [`PageFetcher`],
//! so provider logic stays testable without a network and both sources
//! share one timeout and error-mapping policy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::errors::MarketDataError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Both upstreams serve browsers; a bare reqwest UA gets consent walls or
// empty payloads instead of quote pages.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

/// Fetches a text payload from a URL on behalf of a named provider.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, provider: &str, url: &str) -> Result<String, MarketDataError>;
}

/// Default fetcher backed by a shared reqwest client.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, provider: &str, url: &str) -> Result<String, MarketDataError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: provider.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: provider.to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: provider.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: provider.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: provider.to_string(),
                message: format!("Failed to read response: {}", e),
            })
    }
}
