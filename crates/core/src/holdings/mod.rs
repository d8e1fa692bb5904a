//! Cached access to the static holdings universe.
//!
//! Holdings come from a static export and are treated as immutable for the
//! process lifetime: the store loads once on first access and serves the
//! cached sequence to every snapshot request after that. The loader is
//! injectable so tests and embedders can construct isolated instances.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::errors::Result;
use crate::models::Holding;
use crate::parser;

/// Source of the parsed holdings sequence.
#[async_trait]
pub trait HoldingsLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<Holding>>;
}

/// Loads holdings from a JSON export file: an array of row objects keyed
/// `Column1`..`Column35`, parsed with [`parser::parse_rows`].
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HoldingsLoader for JsonFileLoader {
    async fn load(&self) -> Result<Vec<Holding>> {
        // The export is a small static file; a blocking read is fine here.
        let contents = std::fs::read_to_string(&self.path)?;
        let rows: Vec<Value> = serde_json::from_str(&contents)?;
        let holdings = parser::parse_rows(&rows);
        debug!(
            "loaded {} holdings from {}",
            holdings.len(),
            self.path.display()
        );
        Ok(holdings)
    }
}

/// Process-wide cache over a [`HoldingsLoader`].
///
/// Populated on first access and never refreshed unless [`invalidate`]
/// is called. Safe for concurrent reads; concurrent first accesses may
/// each run the loader, which is acceptable because loading is idempotent
/// and side-effect free - the first population wins and duplicates are
/// discarded.
///
/// [`invalidate`]: HoldingsStore::invalidate
pub struct HoldingsStore {
    loader: Arc<dyn HoldingsLoader>,
    cache: RwLock<Option<Arc<[Holding]>>>,
}

impl HoldingsStore {
    pub fn new(loader: Arc<dyn HoldingsLoader>) -> Self {
        Self {
            loader,
            cache: RwLock::new(None),
        }
    }

    /// The holdings sequence, in declaration order.
    ///
    /// A failed load degrades to an empty (and cached) sequence: a snapshot
    /// is always produced, and zero holdings is the visible signal that the
    /// static source is broken.
    pub async fn holdings(&self) -> Arc<[Holding]> {
        if let Some(cached) = self.cache.read().await.clone() {
            return cached;
        }

        let loaded = match self.loader.load().await {
            Ok(holdings) => holdings,
            Err(e) => {
                warn!("holdings load failed, serving empty sequence: {}", e);
                Vec::new()
            }
        };
        let holdings: Arc<[Holding]> = loaded.into();

        // First population wins; a concurrent loser's identical copy is
        // simply dropped.
        let mut guard = self.cache.write().await;
        guard.get_or_insert_with(|| holdings).clone()
    }

    /// Drop the cached sequence; the next access reloads.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}
