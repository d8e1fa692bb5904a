//! Pure row classification.
//!
//! [`classify_row`] inspects one raw row and tags it. It carries no state,
//! so the sector fold in the parent module stays a plain reduction and the
//! classification rules are testable in isolation.

use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::{Holding, Venue};

use super::columns::{
    COL_EXCHANGE_CODE, COL_FALLBACK_CMP, COL_FALLBACK_EARNINGS, COL_FALLBACK_PE, COL_NAME,
    COL_ORDINAL, COL_PURCHASE_PRICE, COL_QUANTITY, COL_STATUS,
};

/// Sector rows normally carry the "Sector" token; these known labels do
/// not. "Consumer " keeps its trailing space - that is how the export
/// spells it.
const SECTOR_LITERALS: [&str; 3] = ["Power", "Consumer ", "Others"];
const SECTOR_TOKEN: &str = "Sector";

/// Result of classifying a single row.
#[derive(Clone, Debug, PartialEq)]
pub enum RowClass {
    /// Declares a new grouping context for the rows that follow.
    SectorMarker(String),
    /// A retained stock position; the sector is assigned by the caller.
    Stock(Box<StockRow>),
    /// Blank separators, subtotals, exited positions, malformed rows.
    Skip,
}

/// Extracted fields of a stock row, before sector assignment.
#[derive(Clone, Debug, PartialEq)]
pub struct StockRow {
    pub symbol: String,
    pub name: String,
    pub purchase_price: Decimal,
    pub quantity: Decimal,
    pub exchange: Venue,
    pub fallback_cmp: Option<Decimal>,
    pub fallback_pe_ratio: Option<Decimal>,
    pub fallback_earnings: Option<String>,
}

impl StockRow {
    pub fn into_holding(self, sector: String) -> Holding {
        Holding {
            symbol: self.symbol,
            name: self.name,
            purchase_price: self.purchase_price,
            quantity: self.quantity,
            exchange: self.exchange,
            sector,
            fallback_cmp: self.fallback_cmp,
            fallback_pe_ratio: self.fallback_pe_ratio,
            fallback_earnings: self.fallback_earnings,
        }
    }
}

pub fn classify_row(row: &Value) -> RowClass {
    // Sector markers are recognized on the name column alone, before the
    // stock-shape test; a marker may well carry stray values elsewhere.
    if let Some(name) = row.get(COL_NAME).and_then(Value::as_str) {
        if is_sector_marker(name) {
            return RowClass::SectorMarker(name.trim().to_string());
        }
    }

    // Stock shape: numeric ordinal plus a non-empty name.
    let name = match row.get(COL_NAME).and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => return RowClass::Skip,
    };
    if !matches!(row.get(COL_ORDINAL), Some(Value::Number(_))) {
        return RowClass::Skip;
    }

    // Sold or exited positions are dropped even when otherwise well formed.
    if let Some(status) = row.get(COL_STATUS).and_then(Value::as_str) {
        let status = status.to_lowercase();
        if status.contains("exit") || status == "sold" {
            return RowClass::Skip;
        }
    }

    let purchase_price = match positive_number(row.get(COL_PURCHASE_PRICE)) {
        Some(price) => price,
        None => return RowClass::Skip,
    };
    let quantity = match positive_number(row.get(COL_QUANTITY)) {
        Some(quantity) => quantity,
        None => return RowClass::Skip,
    };
    let (symbol, exchange) = match exchange_code(row.get(COL_EXCHANGE_CODE)) {
        Some(code) => code,
        None => return RowClass::Skip,
    };

    RowClass::Stock(Box::new(StockRow {
        symbol,
        name,
        purchase_price,
        quantity,
        exchange,
        fallback_cmp: number_cell(row.get(COL_FALLBACK_CMP)),
        fallback_pe_ratio: number_cell(row.get(COL_FALLBACK_PE)),
        fallback_earnings: earnings_cell(row.get(COL_FALLBACK_EARNINGS)),
    }))
}

fn is_sector_marker(name: &str) -> bool {
    name.contains(SECTOR_TOKEN) || SECTOR_LITERALS.contains(&name)
}

/// The exchange cell is classified purely by type: a non-empty string is
/// an NSE-style alphabetic ticker, a number is a BSE-style numeric code.
fn exchange_code(value: Option<&Value>) -> Option<(String, Venue)> {
    match value {
        Some(Value::String(code)) if !code.is_empty() => {
            Some((code.to_uppercase(), Venue::Nse))
        }
        Some(Value::Number(code)) => Some((render_number(code), Venue::Bse)),
        _ => None,
    }
}

fn number_cell(value: Option<&Value>) -> Option<Decimal> {
    match value {
        Some(Value::Number(number)) => number.as_f64().and_then(Decimal::from_f64),
        _ => None,
    }
}

fn positive_number(value: Option<&Value>) -> Option<Decimal> {
    number_cell(value).filter(|number| number.is_sign_positive() && !number.is_zero())
}

/// Integral values render without a decimal point.
fn render_number(number: &serde_json::Number) -> String {
    number
        .as_i64()
        .map(|integral| integral.to_string())
        .unwrap_or_else(|| number.to_string())
}

/// Fallback earnings may arrive as a number or as reported text.
fn earnings_cell(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Number(number)) => Some(render_number(number)),
        Some(Value::String(text)) => Some(text.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn stock(row: &Value) -> StockRow {
        match classify_row(row) {
            RowClass::Stock(stock) => *stock,
            other => panic!("expected a stock row, got {:?}", other),
        }
    }

    #[test]
    fn test_sector_token_row() {
        let row = json!({"Column2": "Banking Sector"});
        assert_eq!(
            classify_row(&row),
            RowClass::SectorMarker("Banking Sector".to_string())
        );
    }

    #[test]
    fn test_sector_literal_trailing_space_is_trimmed() {
        let row = json!({"Column2": "Consumer "});
        assert_eq!(
            classify_row(&row),
            RowClass::SectorMarker("Consumer".to_string())
        );
    }

    #[test]
    fn test_sector_marker_wins_over_stock_shape() {
        // A numeric ordinal does not stop the name column from declaring
        // a sector.
        let row = json!({"Column1": 4, "Column2": "Others", "Column3": 100, "Column4": 5});
        assert_eq!(classify_row(&row), RowClass::SectorMarker("Others".to_string()));
    }

    #[test]
    fn test_nse_string_code() {
        let row = json!({
            "Column1": 1, "Column2": "HDFC Bank", "Column3": 1490.5,
            "Column4": 10, "Column7": "hdfcbank"
        });
        let stock = stock(&row);
        assert_eq!(stock.symbol, "HDFCBANK");
        assert_eq!(stock.exchange, Venue::Nse);
        assert_eq!(stock.purchase_price, dec!(1490.5));
    }

    #[test]
    fn test_bse_numeric_code() {
        let row = json!({
            "Column1": 2, "Column2": "ICICI Bank", "Column3": 650,
            "Column4": 40, "Column7": 532174
        });
        let stock = stock(&row);
        assert_eq!(stock.symbol, "532174");
        assert_eq!(stock.exchange, Venue::Bse);
    }

    #[test]
    fn test_exit_status_skips_valid_stock_row() {
        for status in ["Must Exit", "exit", "EXITED", "Sold", "sold"] {
            let row = json!({
                "Column1": 1, "Column2": "HDFC Bank", "Column3": 1490.5,
                "Column4": 10, "Column7": "HDFCBANK", "Column35": status
            });
            assert_eq!(classify_row(&row), RowClass::Skip, "status {:?}", status);
        }
    }

    #[test]
    fn test_sold_must_match_exactly() {
        // "resold" contains neither "exit" nor equals "sold"; retained.
        let row = json!({
            "Column1": 1, "Column2": "HDFC Bank", "Column3": 1490.5,
            "Column4": 10, "Column7": "HDFCBANK", "Column35": "resold"
        });
        assert!(matches!(classify_row(&row), RowClass::Stock(_)));
    }

    #[test]
    fn test_non_numeric_ordinal_skipped() {
        let row = json!({"Column1": "1", "Column2": "HDFC Bank", "Column3": 10, "Column4": 1, "Column7": "X"});
        assert_eq!(classify_row(&row), RowClass::Skip);
    }

    #[test]
    fn test_blank_and_subtotal_rows_skipped() {
        assert_eq!(classify_row(&json!({})), RowClass::Skip);
        assert_eq!(classify_row(&json!({"Column2": "   "})), RowClass::Skip);
        assert_eq!(
            classify_row(&json!({"Column2": "Total", "Column3": 99999})),
            RowClass::Skip
        );
    }

    #[test]
    fn test_zero_or_missing_essentials_skipped() {
        let zero_price = json!({"Column1": 1, "Column2": "X", "Column3": 0, "Column4": 10, "Column7": "X"});
        let missing_quantity = json!({"Column1": 1, "Column2": "X", "Column3": 10, "Column7": "X"});
        let negative_quantity = json!({"Column1": 1, "Column2": "X", "Column3": 10, "Column4": -2, "Column7": "X"});
        let empty_exchange = json!({"Column1": 1, "Column2": "X", "Column3": 10, "Column4": 2, "Column7": ""});
        for row in [&zero_price, &missing_quantity, &negative_quantity, &empty_exchange] {
            assert_eq!(classify_row(row), RowClass::Skip);
        }
    }

    #[test]
    fn test_fallback_metrics_captured_opportunistically() {
        let row = json!({
            "Column1": 1, "Column2": "HDFC Bank", "Column3": 1490.5, "Column4": 10,
            "Column7": "HDFCBANK", "Column8": 1650.0, "Column13": 19.2, "Column14": 82.4
        });
        let stock = stock(&row);
        assert_eq!(stock.fallback_cmp, Some(dec!(1650)));
        assert_eq!(stock.fallback_pe_ratio, Some(dec!(19.2)));
        // Numeric earnings are stringified, text is kept verbatim.
        assert_eq!(stock.fallback_earnings, Some("82.4".to_string()));
    }

    #[test]
    fn test_string_earnings_kept_verbatim() {
        let row = json!({
            "Column1": 1, "Column2": "HDFC Bank", "Column3": 1490.5, "Column4": 10,
            "Column7": "HDFCBANK", "Column14": "Q3 FY24: 82.4"
        });
        assert_eq!(
            stock(&row).fallback_earnings,
            Some("Q3 FY24: 82.4".to_string())
        );
    }

    #[test]
    fn test_string_typed_metrics_not_captured_as_numbers() {
        let row = json!({
            "Column1": 1, "Column2": "HDFC Bank", "Column3": 1490.5, "Column4": 10,
            "Column7": "HDFCBANK", "Column8": "1650", "Column13": "19.2"
        });
        let stock = stock(&row);
        assert_eq!(stock.fallback_cmp, None);
        assert_eq!(stock.fallback_pe_ratio, None);
    }

    #[test]
    fn test_name_is_trimmed() {
        let row = json!({"Column1": 1, "Column2": "  HDFC Bank  ", "Column3": 10, "Column4": 1, "Column7": "HDFCBANK"});
        assert_eq!(stock(&row).name, "HDFC Bank");
    }
}
