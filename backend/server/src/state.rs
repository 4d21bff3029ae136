use std::sync::Arc;

use catalog::{FileSource, RecipeSource, RemoteSource};
use tracing::info;

use super::{cache::CatalogCache, config::Config, error::AppError};

pub struct AppState {
    pub config: Config,
    pub cache: CatalogCache,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let source: Arc<dyn RecipeSource> = match &config.recipes_file {
            Some(path) => {
                info!("Serving recipes from local file {path}");
                Arc::new(FileSource::new(path))
            }
            None => Arc::new(RemoteSource::new(&config.recipes_url, config.fetch_timeout)?),
        };

        Ok(Self::with_source(config, source))
    }

    pub fn with_source(config: Config, source: Arc<dyn RecipeSource>) -> Arc<Self> {
        let cache = CatalogCache::new(source, config.cache_ttl, config.serve_stale);

        Arc::new(Self { config, cache })
    }

    /// Loads the catalog ahead of the first request. A failure leaves the cache empty, so the
    /// next request fetches again.
    pub async fn warm(&self) -> Result<usize, AppError> {
        info!("Loading catalog at startup...");

        let catalog = self.cache.get_catalog().await?;
        info!("Catalog ready with {} recipes", catalog.len());

        Ok(catalog.len())
    }
}
