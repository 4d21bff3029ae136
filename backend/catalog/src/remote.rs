use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::{Catalog, FetchError, RecipeSource};

pub struct RemoteSource {
    client: Client,
    url: String,
}

impl RemoteSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl RecipeSource for RemoteSource {
    async fn fetch(&self) -> Result<Catalog, FetchError> {
        info!("Fetching recipes from {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let bytes = response.bytes().await?;
        debug!("Received {} bytes", bytes.len());

        Ok(Catalog::from_slice(&bytes)?)
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}
