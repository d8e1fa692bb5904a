use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trading venue an instrument is listed on.
///
/// The venue drives provider-specific symbol formatting: the batched quote
/// source appends `.NS`/`.BO`, the scraped source prefixes `NSE:`/`BOM:`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Venue {
    Nse,
    Bse,
}

impl Venue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::Nse => "NSE",
            Venue::Bse => "BSE",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statically seeded last-resort metrics, used when no live source
/// supplies a value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FallbackMetrics {
    pub cmp: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
    pub latest_earnings: Option<String>,
}

/// Provider-agnostic instrument identity.
///
/// This is the only input providers see; it deliberately carries no
/// portfolio-level data so this crate stays independent of the core.
#[derive(Clone, Debug, PartialEq)]
pub struct Instrument {
    /// Venue-local symbol: an alphabetic NSE ticker or a numeric BSE code.
    pub symbol: String,
    pub venue: Venue,
    pub fallback: FallbackMetrics,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, venue: Venue) -> Self {
        Self {
            symbol: symbol.into(),
            venue,
            fallback: FallbackMetrics::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackMetrics) -> Self {
        self.fallback = fallback;
        self
    }
}

/// A transient, provider-scoped metric set for one instrument.
///
/// Produced per resolution request and never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricQuote {
    /// Current market price.
    pub cmp: Option<Decimal>,
    /// Trailing price-to-earnings ratio.
    pub pe_ratio: Option<Decimal>,
    /// Latest earnings-per-share figure, as reported text.
    pub latest_earnings: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_venue_as_str() {
        assert_eq!(Venue::Nse.as_str(), "NSE");
        assert_eq!(Venue::Bse.as_str(), "BSE");
    }

    #[test]
    fn test_venue_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Venue::Nse).unwrap(), "\"NSE\"");
        assert_eq!(serde_json::to_string(&Venue::Bse).unwrap(), "\"BSE\"");
    }

    #[test]
    fn test_instrument_with_fallback() {
        let instrument = Instrument::new("HDFCBANK", Venue::Nse).with_fallback(FallbackMetrics {
            cmp: Some(dec!(1650.5)),
            pe_ratio: Some(dec!(19.2)),
            latest_earnings: Some("82.4".to_string()),
        });
        assert_eq!(instrument.symbol, "HDFCBANK");
        assert_eq!(instrument.fallback.cmp, Some(dec!(1650.5)));
    }
}
