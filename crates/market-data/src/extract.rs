//! Label-anchored metric extraction from unstructured payloads.
//!
//! The scraped source serves markup, not an API, so metrics are pulled out
//! by scanning for a label and taking the first plausible value after it.
//! The strategy is behind the [`MetricExtractor`] trait so a structured
//! source could replace it without touching the resolver's merge logic.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

lazy_static! {
    // Accepts "12", "12.5" - nothing with separators, signs, or units.
    static ref CLEAN_DECIMAL: Regex = Regex::new(r"^[0-9]+(\.[0-9]+)?$").unwrap();
}

// Maximum distance between a label and its value. Wide enough to skip the
// markup between them, narrow enough not to latch onto the next metric.
const LABEL_WINDOW: usize = 80;

// Anything longer is a styling token or a runaway match, not a number.
const MAX_TEXT_VALUE_LEN: usize = 20;

/// Pulls named metrics out of an unstructured text payload.
pub trait MetricExtractor: Send + Sync {
    /// First numeric value within the scan window after `label`.
    fn metric_number(&self, page: &str, label: &str) -> Option<Decimal>;

    /// Short, clean decimal immediately after `label`; rejects values that
    /// look like styling tokens or overly long matches.
    fn metric_text(&self, page: &str, label: &str) -> Option<String>;
}

/// Regex-based label scanning over raw markup.
pub struct LabelAnchoredExtractor;

impl MetricExtractor for LabelAnchoredExtractor {
    fn metric_number(&self, page: &str, label: &str) -> Option<Decimal> {
        let pattern = format!(
            "(?i){}[^0-9]{{0,{}}}([0-9.,-]+)",
            regex::escape(label),
            LABEL_WINDOW
        );
        let re = Regex::new(&pattern).ok()?;
        let captures = re.captures(page)?;
        parse_number(captures.get(1)?.as_str())
    }

    fn metric_text(&self, page: &str, label: &str) -> Option<String> {
        let pattern = format!(
            "(?i){}[^0-9]*?([0-9]+(?:\\.[0-9]+)?(?:[^a-zA-Z<]|$))",
            regex::escape(label)
        );
        let re = Regex::new(&pattern).ok()?;
        let captures = re.captures(page)?;
        let value = captures.get(1)?.as_str().trim();

        if CLEAN_DECIMAL.is_match(value) && value.len() < MAX_TEXT_VALUE_LEN {
            Some(value.to_string())
        } else {
            None
        }
    }
}

/// Parses a scraped number, tolerating thousands separators.
fn parse_number(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace(',', "");
    cleaned.trim().parse::<Decimal>().ok()
}
