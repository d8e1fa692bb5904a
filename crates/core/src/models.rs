use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use folioscope_market_data::{FallbackMetrics, Instrument};

pub use folioscope_market_data::Venue;

/// A single static investment position, as reconstructed from the
/// tabular export. Parsing guarantees `purchase_price > 0` and
/// `quantity > 0` for every retained holding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    pub purchase_price: Decimal,
    pub quantity: Decimal,
    pub exchange: Venue,
    pub sector: String,
    pub fallback_cmp: Option<Decimal>,
    pub fallback_pe_ratio: Option<Decimal>,
    pub fallback_earnings: Option<String>,
}

impl Holding {
    /// Provider-facing projection of this holding.
    pub fn instrument(&self) -> Instrument {
        Instrument::new(self.symbol.clone(), self.exchange).with_fallback(FallbackMetrics {
            cmp: self.fallback_cmp,
            pe_ratio: self.fallback_pe_ratio,
            latest_earnings: self.fallback_earnings.clone(),
        })
    }
}

/// A holding plus its derived valuation metrics.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedHolding {
    #[serde(flatten)]
    pub holding: Holding,
    pub investment: Decimal,
    /// Share of the portfolio's total investment, in percent.
    pub weight: Decimal,
    pub cmp: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
    pub latest_earnings: Option<String>,
    pub current_value: Option<Decimal>,
    pub gain_loss: Option<Decimal>,
    pub gain_loss_pct: Option<Decimal>,
}

/// Aggregated figures for one sector bucket.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorSummary {
    pub sector: String,
    pub investment: Decimal,
    pub current_value: Option<Decimal>,
    pub gain_loss: Option<Decimal>,
    pub gain_loss_pct: Option<Decimal>,
}

/// Portfolio-wide totals.
///
/// `current_value` is strictly null-propagating: one holding without a
/// price makes the total unknown, unlike the zero-coalescing sector sums.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub investment: Decimal,
    pub current_value: Option<Decimal>,
    pub gain_loss: Option<Decimal>,
    pub gain_loss_pct: Option<Decimal>,
}

/// The root aggregate: built fresh per request, never mutated after
/// construction, never persisted.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub as_of: DateTime<Utc>,
    /// Sector-then-declaration order, as parsed.
    pub holdings: Vec<EnrichedHolding>,
    /// Ordered by descending investment.
    pub sectors: Vec<SectorSummary>,
    pub totals: PortfolioTotals,
}
