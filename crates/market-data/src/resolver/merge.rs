//! Per-field resolution chains.
//!
//! Each metric has its own source priority, expressed as an ordered list
//! of candidates evaluated front to back; the first present value wins.

use crate::models::{FallbackMetrics, MetricQuote};

pub(crate) fn merge_quote(
    bulk: Option<&MetricQuote>,
    scraped: Option<&MetricQuote>,
    fallback: &FallbackMetrics,
) -> MetricQuote {
    MetricQuote {
        cmp: first_some([
            bulk.and_then(|q| q.cmp),
            scraped.and_then(|q| q.cmp),
            fallback.cmp,
        ]),
        pe_ratio: first_some([
            scraped.and_then(|q| q.pe_ratio),
            bulk.and_then(|q| q.pe_ratio),
            fallback.pe_ratio,
        ]),
        latest_earnings: first_some([
            scraped.and_then(|q| q.latest_earnings.clone()),
            bulk.and_then(|q| q.latest_earnings.clone()),
            fallback.latest_earnings.clone(),
        ]),
    }
}

fn first_some<T, const N: usize>(candidates: [Option<T>; N]) -> Option<T> {
    candidates.into_iter().flatten().next()
}
