//! Portfolio snapshot assembly.
//!
//! Orchestrates the cached holdings, the two-source quote resolution, and
//! the derived-metric arithmetic into one immutable [`PortfolioSnapshot`].
//! Building a snapshot never fails: upstream trouble surfaces as fallback
//! values or nulls in the result, not as an error.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};

use folioscope_market_data::{Instrument, MetricQuote, QuoteResolver};

use crate::holdings::HoldingsStore;
use crate::models::{
    EnrichedHolding, Holding, PortfolioSnapshot, PortfolioTotals, SectorSummary,
};
use crate::parser::DEFAULT_SECTOR;

pub struct SnapshotService {
    store: Arc<HoldingsStore>,
    resolver: Arc<QuoteResolver>,
}

impl SnapshotService {
    pub fn new(store: Arc<HoldingsStore>, resolver: Arc<QuoteResolver>) -> Self {
        Self { store, resolver }
    }

    /// Build a fresh snapshot of the whole portfolio.
    pub async fn snapshot(&self) -> PortfolioSnapshot {
        let holdings = self.store.holdings().await;
        let instruments: Vec<Instrument> = holdings.iter().map(Holding::instrument).collect();
        let quotes = self.resolver.resolve(&instruments).await;

        // Weights are computed against the unrounded total so they sum to
        // 100 within accumulation error.
        let total_investment: Decimal = holdings
            .iter()
            .map(|holding| holding.purchase_price * holding.quantity)
            .sum();

        let enriched: Vec<EnrichedHolding> = holdings
            .iter()
            .map(|holding| enrich(holding, quotes.get(&holding.symbol), total_investment))
            .collect();

        PortfolioSnapshot {
            as_of: Utc::now(),
            totals: compute_totals(&enriched, total_investment),
            sectors: aggregate_sectors(&enriched),
            holdings: enriched,
        }
    }
}

/// Half-up rounding to two decimal places, for monetary figures and
/// percentages alike.
fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn enrich(
    holding: &Holding,
    quote: Option<&MetricQuote>,
    total_investment: Decimal,
) -> EnrichedHolding {
    let investment = holding.purchase_price * holding.quantity;

    let cmp = quote.and_then(|q| q.cmp);
    let pe_ratio = quote.and_then(|q| q.pe_ratio);
    let latest_earnings = quote.and_then(|q| q.latest_earnings.clone());

    // A price of zero is an upstream artifact, not a market state;
    // treat it the same as no price at all.
    let current_value = cmp
        .filter(|price| !price.is_zero())
        .map(|price| price * holding.quantity);
    let gain_loss = current_value.map(|value| value - investment);
    let gain_loss_pct = gain_loss
        .filter(|_| !investment.is_zero())
        .map(|gain| gain / investment * Decimal::ONE_HUNDRED);

    let weight = if total_investment.is_zero() {
        Decimal::ZERO
    } else {
        investment / total_investment * Decimal::ONE_HUNDRED
    };

    EnrichedHolding {
        holding: holding.clone(),
        investment: round2(investment),
        weight: round2(weight),
        cmp: cmp.map(round2),
        pe_ratio: pe_ratio.map(round2),
        latest_earnings,
        current_value: current_value.map(round2),
        gain_loss: gain_loss.map(round2),
        gain_loss_pct: gain_loss_pct.map(round2),
    }
}

/// Grand totals. Investment always sums; current value propagates strict
/// null - one unpriced holding makes the total unknown.
fn compute_totals(holdings: &[EnrichedHolding], total_investment: Decimal) -> PortfolioTotals {
    let mut current_total = Decimal::ZERO;
    let mut missing_current = false;

    for holding in holdings {
        match holding.current_value {
            Some(value) => current_total += value,
            None => missing_current = true,
        }
    }

    let current_value = if missing_current {
        None
    } else {
        Some(round2(current_total))
    };
    let gain_loss = current_value.map(|value| round2(value - total_investment));
    let gain_loss_pct = gain_loss
        .filter(|_| !total_investment.is_zero())
        .map(|gain| round2(gain / total_investment * Decimal::ONE_HUNDRED));

    PortfolioTotals {
        investment: round2(total_investment),
        current_value,
        gain_loss,
        gain_loss_pct,
    }
}

/// Per-sector buckets, in first-seen order, then sorted by descending
/// investment. Unlike the totals, a missing current value contributes
/// zero here, and a sector with no priced holding reports null gain/loss.
fn aggregate_sectors(holdings: &[EnrichedHolding]) -> Vec<SectorSummary> {
    struct Bucket {
        investment: Decimal,
        current_value: Decimal,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut buckets: HashMap<&str, Bucket> = HashMap::new();

    for holding in holdings {
        let sector = match holding.holding.sector.as_str() {
            "" => DEFAULT_SECTOR,
            sector => sector,
        };
        let bucket = buckets.entry(sector).or_insert_with(|| {
            order.push(sector);
            Bucket {
                investment: Decimal::ZERO,
                current_value: Decimal::ZERO,
            }
        });
        bucket.investment += holding.investment;
        bucket.current_value += holding.current_value.unwrap_or_default();
    }

    let mut sectors: Vec<SectorSummary> = order
        .into_iter()
        .map(|sector| {
            let bucket = &buckets[sector];
            let has_current = bucket.current_value > Decimal::ZERO;
            let gain_loss = has_current.then(|| bucket.current_value - bucket.investment);
            let gain_loss_pct = gain_loss
                .filter(|_| !bucket.investment.is_zero())
                .map(|gain| round2(gain / bucket.investment * Decimal::ONE_HUNDRED));

            SectorSummary {
                sector: sector.to_string(),
                investment: round2(bucket.investment),
                current_value: has_current.then(|| round2(bucket.current_value)),
                gain_loss: gain_loss.map(round2),
                gain_loss_pct,
            }
        })
        .collect();

    sectors.sort_by(|a, b| b.investment.cmp(&a.investment));
    sectors
}
