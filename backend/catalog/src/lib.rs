//! # Catalog
//!
//! Where recipes come from.
//!
//! The upstream `recipes.json` is owned by a third party, so this crate treats it as an
//! opaque, possibly slow, possibly failing data source behind [`RecipeSource`]. The server
//! never talks HTTP to the upstream directly, which keeps its cache testable with an
//! in-memory source.
//!
//! Two sources ship:
//! - [`RemoteSource`]: GET on the published document, the normal deployment
//! - [`FileSource`]: a local snapshot of the same document, for offline runs
use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

pub mod recipes;
pub mod remote;

pub use recipes::{Catalog, Recipe};
pub use remote::RemoteSource;

pub const DEFAULT_RECIPES_URL: &str = "https://www.digitalfarmsystem.com/recipes.json";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch recipes.json: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to fetch recipes.json: upstream returned {0}")]
    Status(StatusCode),

    #[error("Failed to read recipes file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed recipes.json: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Loads the whole catalog. Called once per cache generation.
    async fn fetch(&self) -> Result<Catalog, FetchError>;

    /// Where the catalog is loaded from, for logs.
    fn location(&self) -> String;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecipeSource for FileSource {
    async fn fetch(&self) -> Result<Catalog, FetchError> {
        let data = tokio::fs::read(&self.path).await?;
        debug!("Read {} bytes from {}", data.len(), self.path.display());

        Ok(Catalog::from_slice(&data)?)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
