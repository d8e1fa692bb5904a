//! Metric provider trait definition.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::{Instrument, MetricQuote};

use super::capabilities::RateLimit;

/// A source of market metrics for a set of instruments.
///
/// Implementations choose their own fetch strategy (one batched request,
/// a sequential per-instrument loop, ...) but share one boundary contract:
/// `fetch_metrics` never fails. Upstream trouble is degraded to the
/// affected instrument's static fallback values inside the provider, so a
/// snapshot build can always complete.
#[async_trait]
pub trait MetricProvider: Send + Sync {
    /// Unique identifier, used for logging and error attribution.
    fn id(&self) -> &'static str;

    /// Rate limiting posture for this source.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    /// Fetch metrics for the given instruments, keyed by venue-local symbol.
    async fn fetch_metrics(&self, instruments: &[Instrument]) -> HashMap<String, MetricQuote>;
}
