pub mod errors;
pub mod holdings;
pub mod models;
pub mod parser;
pub mod snapshot;

pub use errors::{Error, Result};
pub use holdings::{HoldingsLoader, HoldingsStore, JsonFileLoader};
pub use models::{
    EnrichedHolding, Holding, PortfolioSnapshot, PortfolioTotals, SectorSummary, Venue,
};
pub use snapshot::SnapshotService;
