use std::{env, fmt::Display, str::FromStr, time::Duration};

use catalog::DEFAULT_RECIPES_URL;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub recipes_url: String,
    pub recipes_file: Option<String>,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub page_size: usize,
    pub default_limit: usize,
    pub byte_budget: usize,
    pub eager_load: bool,
    pub serve_stale: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            recipes_url: DEFAULT_RECIPES_URL.to_string(),
            recipes_file: None,
            cache_ttl: Duration::from_secs(600),
            fetch_timeout: Duration::from_secs(10),
            page_size: 9,
            default_limit: 5,
            byte_budget: 2048,
            eager_load: false,
            serve_stale: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, the process environment in production.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            port: try_load(&lookup, "PORT", defaults.port)?,
            recipes_url: try_load(&lookup, "RECIPES_URL", defaults.recipes_url)?,
            recipes_file: lookup("RECIPES_FILE").filter(|path| !path.trim().is_empty()),
            cache_ttl: Duration::from_secs(try_load(
                &lookup,
                "CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )?),
            fetch_timeout: Duration::from_secs(try_load(
                &lookup,
                "FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout.as_secs(),
            )?),
            page_size: positive(try_load(&lookup, "PAGE_SIZE", defaults.page_size)?, "PAGE_SIZE")?,
            default_limit: positive(
                try_load(&lookup, "DEFAULT_LIMIT", defaults.default_limit)?,
                "DEFAULT_LIMIT",
            )?,
            byte_budget: positive(
                try_load(&lookup, "BYTE_BUDGET", defaults.byte_budget)?,
                "BYTE_BUDGET",
            )?,
            eager_load: try_load(&lookup, "EAGER_LOAD", defaults.eager_load)?,
            serve_stale: try_load(&lookup, "SERVE_STALE", defaults.serve_stale)?,
        })
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return Ok(default);
    };

    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");

        ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }
    })
}

fn positive(value: usize, key: &'static str) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(value)
}
