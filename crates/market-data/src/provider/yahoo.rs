//! Batched price/PE provider backed by the public v7 quote endpoint.
//!
//! All instruments go out in a single request, with symbols rewritten to
//! the endpoint's venue-suffixed ticker format (`.NS` / `.BO`). Entries
//! come back keyed by that suffixed ticker; they are mapped to the
//! requested symbols by stripping the suffix again. A missing entry, a
//! non-finite price, or a total request failure all degrade to the
//! instrument's static fallback price.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::http::{HttpPageFetcher, PageFetcher};
use crate::models::{Instrument, MetricQuote, Venue};
use crate::provider::MetricProvider;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const PROVIDER_ID: &str = "YAHOO";

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse", default)]
    quote_response: QuoteBody,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBody {
    #[serde(default)]
    result: Vec<QuoteItem>,
}

/// One per-symbol result object. Only the fields this provider consumes
/// are declared; the endpoint sends dozens more.
#[derive(Debug, Deserialize)]
struct QuoteItem {
    symbol: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
}

// ============================================================================
// YahooQuoteProvider
// ============================================================================

pub struct YahooQuoteProvider {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl YahooQuoteProvider {
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(HttpPageFetcher::new()))
    }

    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the endpoint, for embedders that proxy the upstream.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Venue-suffixed ticker the endpoint expects.
    fn provider_symbol(instrument: &Instrument) -> String {
        match instrument.venue {
            Venue::Nse => format!("{}.NS", instrument.symbol),
            Venue::Bse => format!("{}.BO", instrument.symbol),
        }
    }

    /// Inverse of [`provider_symbol`](Self::provider_symbol).
    fn strip_venue_suffix(symbol: &str) -> &str {
        symbol
            .strip_suffix(".NS")
            .or_else(|| symbol.strip_suffix(".BO"))
            .unwrap_or(symbol)
    }

    fn parse_response(
        body: &str,
        instruments: &[Instrument],
    ) -> Result<HashMap<String, MetricQuote>, MarketDataError> {
        let envelope: QuoteEnvelope =
            serde_json::from_str(body).map_err(|e| MarketDataError::ParseFailed {
                provider: PROVIDER_ID.to_string(),
                message: format!("Invalid quote response: {}", e),
            })?;

        let mut by_symbol: HashMap<String, QuoteItem> = HashMap::new();
        for item in envelope.quote_response.result {
            if let Some(symbol) = item.symbol.as_deref() {
                by_symbol.insert(Self::strip_venue_suffix(symbol).to_string(), item);
            }
        }

        let mut quotes = HashMap::with_capacity(instruments.len());
        for instrument in instruments {
            let entry = by_symbol.get(&instrument.symbol);
            let live_cmp = entry
                .and_then(|item| item.regular_market_price)
                .filter(|price| price.is_finite())
                .and_then(Decimal::from_f64);
            let pe_ratio = entry
                .and_then(|item| item.trailing_pe)
                .filter(|pe| pe.is_finite())
                .and_then(Decimal::from_f64);

            quotes.insert(
                instrument.symbol.clone(),
                MetricQuote {
                    cmp: live_cmp.or(instrument.fallback.cmp),
                    pe_ratio,
                    latest_earnings: None,
                },
            );
        }

        Ok(quotes)
    }

    /// Every requested symbol resolved to its static fallback price.
    fn fallback_quotes(instruments: &[Instrument]) -> HashMap<String, MetricQuote> {
        instruments
            .iter()
            .map(|instrument| {
                (
                    instrument.symbol.clone(),
                    MetricQuote {
                        cmp: instrument.fallback.cmp,
                        pe_ratio: None,
                        latest_earnings: None,
                    },
                )
            })
            .collect()
    }
}

impl Default for YahooQuoteProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricProvider for YahooQuoteProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_metrics(&self, instruments: &[Instrument]) -> HashMap<String, MetricQuote> {
        if instruments.is_empty() {
            return HashMap::new();
        }

        let tickers: Vec<String> = instruments.iter().map(Self::provider_symbol).collect();
        let url = format!("{}?symbols={}", self.base_url, tickers.join(","));

        let body = match self.fetcher.fetch_text(PROVIDER_ID, &url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    "{}: batch quote request for {} symbols failed, using fallback prices: {}",
                    PROVIDER_ID,
                    instruments.len(),
                    e
                );
                return Self::fallback_quotes(instruments);
            }
        };

        match Self::parse_response(&body, instruments) {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!("{}: {}, using fallback prices", PROVIDER_ID, e);
                Self::fallback_quotes(instruments)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FallbackMetrics;
    use rust_decimal_macros::dec;

    fn nse(symbol: &str, fallback_cmp: Option<Decimal>) -> Instrument {
        Instrument::new(symbol, Venue::Nse).with_fallback(FallbackMetrics {
            cmp: fallback_cmp,
            ..FallbackMetrics::default()
        })
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch_text(&self, provider: &str, _url: &str) -> Result<String, MarketDataError> {
            Err(MarketDataError::Timeout {
                provider: provider.to_string(),
            })
        }
    }

    #[test]
    fn test_provider_symbol_by_venue() {
        assert_eq!(
            YahooQuoteProvider::provider_symbol(&Instrument::new("HDFCBANK", Venue::Nse)),
            "HDFCBANK.NS"
        );
        assert_eq!(
            YahooQuoteProvider::provider_symbol(&Instrument::new("532174", Venue::Bse)),
            "532174.BO"
        );
    }

    #[test]
    fn test_strip_venue_suffix() {
        assert_eq!(YahooQuoteProvider::strip_venue_suffix("HDFCBANK.NS"), "HDFCBANK");
        assert_eq!(YahooQuoteProvider::strip_venue_suffix("532174.BO"), "532174");
        assert_eq!(YahooQuoteProvider::strip_venue_suffix("AAPL"), "AAPL");
    }

    #[test]
    fn test_parse_response_maps_price_and_pe() {
        let body = r#"{
            "quoteResponse": {
                "result": [
                    {"symbol": "HDFCBANK.NS", "regularMarketPrice": 1712.4, "trailingPE": 19.8}
                ]
            }
        }"#;
        let instruments = [nse("HDFCBANK", Some(dec!(1600)))];

        let quotes = YahooQuoteProvider::parse_response(body, &instruments).unwrap();
        let quote = &quotes["HDFCBANK"];
        assert_eq!(quote.cmp, Some(dec!(1712.4)));
        assert_eq!(quote.pe_ratio, Some(dec!(19.8)));
        assert_eq!(quote.latest_earnings, None);
    }

    #[test]
    fn test_parse_response_missing_entry_uses_fallback_cmp() {
        let body = r#"{"quoteResponse": {"result": []}}"#;
        let instruments = [nse("DMART", Some(dec!(3950.25)))];

        let quotes = YahooQuoteProvider::parse_response(body, &instruments).unwrap();
        let quote = &quotes["DMART"];
        assert_eq!(quote.cmp, Some(dec!(3950.25)));
        assert_eq!(quote.pe_ratio, None);
    }

    #[test]
    fn test_parse_response_null_price_uses_fallback_cmp() {
        let body = r#"{
            "quoteResponse": {
                "result": [
                    {"symbol": "DMART.NS", "regularMarketPrice": null, "trailingPE": 88.1}
                ]
            }
        }"#;
        let instruments = [nse("DMART", Some(dec!(3950)))];

        let quotes = YahooQuoteProvider::parse_response(body, &instruments).unwrap();
        let quote = &quotes["DMART"];
        // Price falls back, but the live PE is still taken.
        assert_eq!(quote.cmp, Some(dec!(3950)));
        assert_eq!(quote.pe_ratio, Some(dec!(88.1)));
    }

    #[test]
    fn test_parse_response_no_fallback_resolves_to_none() {
        let body = r#"{"quoteResponse": {"result": []}}"#;
        let instruments = [nse("DMART", None)];

        let quotes = YahooQuoteProvider::parse_response(body, &instruments).unwrap();
        assert_eq!(quotes["DMART"].cmp, None);
    }

    #[test]
    fn test_parse_response_tolerates_missing_envelope() {
        let quotes =
            YahooQuoteProvider::parse_response("{}", &[nse("DMART", Some(dec!(10)))]).unwrap();
        assert_eq!(quotes["DMART"].cmp, Some(dec!(10)));
    }

    #[test]
    fn test_parse_response_invalid_json_is_an_error() {
        let result = YahooQuoteProvider::parse_response("<html>rate limited</html>", &[]);
        assert!(matches!(result, Err(MarketDataError::ParseFailed { .. })));
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_every_symbol() {
        let provider = YahooQuoteProvider::with_fetcher(Arc::new(FailingFetcher));
        let instruments = vec![nse("HDFCBANK", Some(dec!(1600))), nse("DMART", None)];

        let quotes = provider.fetch_metrics(&instruments).await;
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes["HDFCBANK"].cmp, Some(dec!(1600)));
        assert_eq!(quotes["DMART"].cmp, None);
        assert_eq!(quotes["HDFCBANK"].pe_ratio, None);
    }

    #[tokio::test]
    async fn test_empty_instrument_list_issues_no_request() {
        // FailingFetcher would error; an empty input must never reach it.
        let provider = YahooQuoteProvider::with_fetcher(Arc::new(FailingFetcher));
        assert!(provider.fetch_metrics(&[]).await.is_empty());
    }
}
