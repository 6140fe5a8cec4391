//! Catalog store - the last successfully ingested catalog, shared behind a lock.
//!
//! A refresh only replaces the stored catalog once the feed has been fetched
//! and parsed. A failed fetch leaves whatever was there before. Each refresh
//! takes a generation number when it starts; when refreshes overlap, the one
//! started last wins even if an older one finishes after it.

use crate::core::catalog::{self, FeedDialect, IngestOutcome, IngestResult, SkippedRow};
use crate::core::feed::FeedSource;
use crate::errors::Result;
use crate::models::Product;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, error, info, trace};

/// An immutable snapshot of one successful ingestion pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    result: IngestResult,
    source: String,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Wraps an ingestion result, stamping it with the current time.
    #[must_use]
    pub fn new(result: IngestResult, source: impl Into<String>) -> Self {
        Self {
            result,
            source: source.into(),
            loaded_at: Utc::now(),
        }
    }

    /// Products in id order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.result.products
    }

    /// Rows excluded from this catalog.
    #[must_use]
    pub fn skipped_rows(&self) -> &[SkippedRow] {
        &self.result.skipped_rows
    }

    /// Looks up a product by its batch id.
    #[must_use]
    pub fn product(&self, id: u32) -> Option<&Product> {
        // ids are dense and 1-based
        let position = usize::try_from(id).ok()?.checked_sub(1)?;
        self.result.products.get(position).filter(|p| p.id == id)
    }

    /// Complete or partial, with counts.
    #[must_use]
    pub fn outcome(&self) -> IngestOutcome {
        self.result.outcome()
    }

    /// Where the feed was read from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// When the ingestion pass finished.
    #[must_use]
    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Shared slot holding the current catalog, if any has loaded yet.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    current: Arc<RwLock<StoredCatalog>>,
    generations: Arc<AtomicU64>,
}

#[derive(Debug, Default)]
struct StoredCatalog {
    // generation of the refresh that stored `catalog`; 0 before any
    generation: u64,
    catalog: Option<Arc<Catalog>>,
}

impl CatalogStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog most recently stored.
    pub async fn current(&self) -> Option<Arc<Catalog>> {
        self.current.read().await.catalog.clone()
    }

    /// Fetches and parses the feed, then swaps the result in.
    ///
    /// A refresh started later supersedes one started earlier: if a newer
    /// refresh has already stored its catalog, this one's result is dropped
    /// and the newer catalog is returned instead.
    ///
    /// # Errors
    /// Propagates the source's retrieval error; the stored catalog is untouched.
    pub async fn refresh(
        &self,
        source: &dyn FeedSource,
        dialect: FeedDialect,
    ) -> Result<Arc<Catalog>> {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        info!(generation, "Refreshing catalog from {}...", source.location());
        let body = match source.fetch().await {
            Ok(body) => body,
            Err(e) => {
                error!("Catalog refresh failed, keeping previous catalog: {}", e);
                return Err(e);
            }
        };

        let result = catalog::ingest_with(&body, dialect);
        let fresh = Arc::new(Catalog::new(result, source.location()));

        let mut writer = self.current.write().await;
        if writer.generation > generation {
            debug!(
                generation,
                stored = writer.generation,
                "Discarding catalog superseded by a newer refresh"
            );
            return Ok(writer.catalog.clone().unwrap_or(fresh));
        }
        writer.generation = generation;
        writer.catalog = Some(Arc::clone(&fresh));
        info!("Catalog refreshed: {}", fresh.outcome());
        trace!("Catalog now contains: {:?}", fresh.products());
        Ok(fresh)
    }

    /// Drops the stored catalog.
    pub async fn clear(&self) {
        self.current.write().await.catalog = None;
    }
}
