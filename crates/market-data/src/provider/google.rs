//! Scraped per-symbol metrics provider.
//!
//! This source has no API: each instrument is one page fetch against a
//! venue-qualified path (`NSE:<symbol>` / `BOM:<symbol>`), scanned for
//! labeled values by a [`MetricExtractor`]. The loop is strictly
//! sequential and sleeps a fixed delay after every instrument, success or
//! not, to avoid upstream throttling. A failed fetch or extraction only
//! degrades that one instrument to its static fallback values.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::extract::{LabelAnchoredExtractor, MetricExtractor};
use crate::http::{HttpPageFetcher, PageFetcher};
use crate::models::{Instrument, MetricQuote, Venue};
use crate::provider::{MetricProvider, RateLimit};

const BASE_URL: &str = "https://www.google.com/finance/quote";
const PROVIDER_ID: &str = "GOOGLE_FINANCE";

const PE_LABEL: &str = "P/E ratio";
const EPS_LABELS: [&str; 2] = ["Earnings per share", "EPS"];

const MIN_REQUEST_DELAY: Duration = Duration::from_millis(100);

pub struct GoogleFinanceProvider {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn MetricExtractor>,
    base_url: String,
}

impl GoogleFinanceProvider {
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(HttpPageFetcher::new()),
            Arc::new(LabelAnchoredExtractor),
        )
    }

    pub fn with_parts(fetcher: Arc<dyn PageFetcher>, extractor: Arc<dyn MetricExtractor>) -> Self {
        Self {
            fetcher,
            extractor,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the endpoint, for embedders that proxy the upstream.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Venue-qualified identifier used in the quote page path.
    fn venue_symbol(instrument: &Instrument) -> String {
        match instrument.venue {
            Venue::Nse => format!("NSE:{}", instrument.symbol),
            Venue::Bse => format!("BOM:{}", instrument.symbol),
        }
    }

    /// Live metrics for one instrument: (P/E ratio, earnings per share).
    async fn fetch_one(
        &self,
        instrument: &Instrument,
    ) -> Result<(Option<Decimal>, Option<String>), MarketDataError> {
        let url = format!("{}/{}", self.base_url, Self::venue_symbol(instrument));
        let page = self.fetcher.fetch_text(PROVIDER_ID, &url).await?;

        let pe_ratio = self.extractor.metric_number(&page, PE_LABEL);
        let earnings = EPS_LABELS
            .iter()
            .find_map(|label| self.extractor.metric_text(&page, label));

        debug!(
            "{}: {} -> pe={:?} eps={:?}",
            PROVIDER_ID, instrument.symbol, pe_ratio, earnings
        );

        Ok((pe_ratio, earnings))
    }
}

impl Default for GoogleFinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricProvider for GoogleFinanceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            max_concurrency: 1,
            min_delay: MIN_REQUEST_DELAY,
        }
    }

    async fn fetch_metrics(&self, instruments: &[Instrument]) -> HashMap<String, MetricQuote> {
        let delay = self.rate_limit().min_delay;
        let mut results = HashMap::with_capacity(instruments.len());

        for instrument in instruments {
            let quote = match self.fetch_one(instrument).await {
                Ok((pe_ratio, earnings)) => MetricQuote {
                    cmp: None,
                    pe_ratio: pe_ratio.or(instrument.fallback.pe_ratio),
                    latest_earnings: earnings.or_else(|| instrument.fallback.latest_earnings.clone()),
                },
                Err(e) => {
                    warn!(
                        "{}: {} failed, using fallback metrics: {}",
                        PROVIDER_ID, instrument.symbol, e
                    );
                    MetricQuote {
                        cmp: None,
                        pe_ratio: instrument.fallback.pe_ratio,
                        latest_earnings: instrument.fallback.latest_earnings.clone(),
                    }
                }
            };
            results.insert(instrument.symbol.clone(), quote);

            // After every request, not between them: the last fetch also
            // pays the delay so back-to-back resolutions stay throttled.
            tokio::time::sleep(delay).await;
        }

        results
    }
}

// ============================================================================
// Tests
// ============================================================================
