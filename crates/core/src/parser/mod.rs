//! Tolerant parser for the tabular holdings export.
//!
//! Rows arrive as loosely typed JSON objects keyed `Column1`..`Column35`,
//! with an implicit sectional structure: a sector marker row applies to
//! every stock row after it until the next marker. A single forward pass
//! classifies each row and folds the sector context through. Anything
//! that is neither a marker nor a well-formed stock row is dropped
//! silently; malformed input is an expected shape of this source, not an
//! error.

mod classifier;
mod columns;

pub use classifier::{classify_row, RowClass, StockRow};

use log::debug;
use serde_json::Value;

use crate::models::Holding;

/// Sector assigned to holdings seen before any sector marker.
pub const DEFAULT_SECTOR: &str = "Unknown";

/// Parse an ordered sequence of raw rows into holdings, in declaration
/// order. The first row is the header and is discarded; `null` rows are
/// artifacts of the export and are ignored.
pub fn parse_rows(rows: &[Value]) -> Vec<Holding> {
    let mut holdings = Vec::new();
    let mut current_sector: Option<String> = None;

    for row in rows.iter().skip(1).filter(|row| !row.is_null()) {
        match classify_row(row) {
            RowClass::SectorMarker(sector) => current_sector = Some(sector),
            RowClass::Stock(stock) => {
                let sector = current_sector
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SECTOR.to_string());
                holdings.push(stock.into_holding(sector));
            }
            RowClass::Skip => debug!("dropping non-stock row"),
        }
    }

    holdings
}
