//! # Catalog Cache
//!
//! In-memory, time-bounded copy of the upstream catalog.
//!
//! ## Requirements
//!
//! - One outbound fetch per TTL window under normal load
//! - Catalog replaced wholesale, never patched
//! - Readers never wait on an outbound fetch
//!
//! ## Implementation
//!
//! - Single slot: `RwLock<Option<CacheEntry>>`
//! - The lock is held only to check the slot and to swap in a new entry, never across the fetch
//! - Catalogs are shared as `Arc<Catalog>`, so a swap does not disturb requests still rendering
//!   the previous generation
//! - Concurrent misses may each fetch; the last one to finish wins the slot
//! - A failed refresh propagates unless `serve_stale` is set, in which case the expired catalog
//!   is served and the next request tries again
use std::{sync::Arc, time::Duration};

use catalog::{Catalog, RecipeSource};
use tokio::{sync::RwLock, time::Instant};
use tracing::{debug, info, warn};

use crate::error::AppError;

struct CacheEntry {
    fetched_at: Instant,
    catalog: Arc<Catalog>,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStatus {
    pub recipes: usize,
    pub age: Duration,
    pub fresh: bool,
}

pub struct CatalogCache {
    source: Arc<dyn RecipeSource>,
    ttl: Duration,
    serve_stale: bool,
    slot: RwLock<Option<CacheEntry>>,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn RecipeSource>, ttl: Duration, serve_stale: bool) -> Self {
        Self {
            source,
            ttl,
            serve_stale,
            slot: RwLock::new(None),
        }
    }

    pub async fn get_catalog(&self) -> Result<Arc<Catalog>, AppError> {
        if let Some(entry) = self.slot.read().await.as_ref() {
            if entry.is_fresh(self.ttl) {
                debug!("Catalog cache hit");
                return Ok(entry.catalog.clone());
            }
        }

        debug!("Catalog cache miss, fetching from {}", self.source.location());

        match self.source.fetch().await {
            Ok(catalog) => {
                info!("Loaded {} recipes", catalog.len());

                let catalog = Arc::new(catalog);
                *self.slot.write().await = Some(CacheEntry {
                    fetched_at: Instant::now(),
                    catalog: catalog.clone(),
                });

                Ok(catalog)
            }
            Err(e) => {
                if self.serve_stale {
                    if let Some(entry) = self.slot.read().await.as_ref() {
                        warn!("Refresh failed, serving stale catalog: {e}");
                        return Ok(entry.catalog.clone());
                    }
                }

                Err(e.into())
            }
        }
    }

    /// Snapshot for health reporting. Never triggers a fetch.
    pub async fn status(&self) -> Option<CacheStatus> {
        self.slot.read().await.as_ref().map(|entry| CacheStatus {
            recipes: entry.catalog.len(),
            age: entry.fetched_at.elapsed(),
            fresh: entry.is_fresh(self.ttl),
        })
    }
}
