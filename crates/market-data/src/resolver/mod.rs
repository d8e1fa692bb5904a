//! Concurrent two-source quote resolution.
//!
//! The resolver fans out to both providers at once and merges their
//! results per instrument with one ordered chain per field. The batched
//! source is authoritative for prices, the scraped source for ratios and
//! earnings; static fallbacks close each chain.

mod merge;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::models::{Instrument, MetricQuote};
use crate::provider::{GoogleFinanceProvider, MetricProvider, YahooQuoteProvider};

// Per-instrument budget for the sequential source: the transport timeout
// plus headroom; its inter-request delay is added on top. The loop cannot
// legitimately take longer than this per instrument, so the overall
// deadline scales linearly with the instrument count.
const SCRAPE_REQUEST_BUDGET: Duration = Duration::from_secs(35);

pub struct QuoteResolver {
    /// Authoritative for `cmp`; consulted second for ratios.
    price_source: Arc<dyn MetricProvider>,
    /// Authoritative for `pe_ratio` and `latest_earnings`.
    ratio_source: Arc<dyn MetricProvider>,
}

impl QuoteResolver {
    pub fn new(price_source: Arc<dyn MetricProvider>, ratio_source: Arc<dyn MetricProvider>) -> Self {
        Self {
            price_source,
            ratio_source,
        }
    }

    /// The stock pairing: batched quote endpoint + scraped quote pages.
    pub fn with_default_providers() -> Self {
        Self::new(
            Arc::new(YahooQuoteProvider::new()),
            Arc::new(GoogleFinanceProvider::new()),
        )
    }

    /// Resolve metrics for every instrument, keyed by venue-local symbol.
    ///
    /// Never fails: provider trouble has already been degraded to fallback
    /// values inside each provider, and the merge chains tolerate missing
    /// entries on either side.
    pub async fn resolve(&self, instruments: &[Instrument]) -> HashMap<String, MetricQuote> {
        let (bulk, scraped) = tokio::join!(
            self.price_source.fetch_metrics(instruments),
            self.ratios_with_deadline(instruments),
        );

        instruments
            .iter()
            .map(|instrument| {
                let quote = merge::merge_quote(
                    bulk.get(&instrument.symbol),
                    scraped.get(&instrument.symbol),
                    &instrument.fallback,
                );
                (instrument.symbol.clone(), quote)
            })
            .collect()
    }

    /// The sequential source under an overall deadline. A stuck loop is
    /// abandoned wholesale; the merge chains then serve static fallbacks
    /// for every instrument, same as any other degradation.
    async fn ratios_with_deadline(
        &self,
        instruments: &[Instrument],
    ) -> HashMap<String, MetricQuote> {
        let per_instrument = SCRAPE_REQUEST_BUDGET + self.ratio_source.rate_limit().min_delay;
        let deadline = per_instrument * instruments.len().max(1) as u32;

        match tokio::time::timeout(deadline, self.ratio_source.fetch_metrics(instruments)).await {
            Ok(quotes) => quotes,
            Err(_) => {
                warn!(
                    "{}: sequential fetch missed its {:?} deadline, serving static fallbacks",
                    self.ratio_source.id(),
                    deadline
                );
                HashMap::new()
            }
        }
    }
}
