//! Documentation of the DFS recipe proxy.
//!
//! An HTTP service in front of the third-party `recipes.json` published by Digital Farm
//! System. In-world scripts can only make small, simple HTTP requests, so this service
//! fetches the whole document, keeps it in memory, and answers name searches with a page of
//! results at a time.
//!
//!
//!
//! # General Infrastructure
//! - In-world object sends `GET /recipe?name=...` to this service
//! - Service answers from its in-memory catalog, fetching `recipes.json` when the copy is
//!   older than the TTL
//! - One process, one cache slot, no database
//! - A browser can use the same endpoints with `human=html`
//!
//!
//!
//! # Notes
//!
//! ## Cache
//! The upstream document changes rarely and is small enough to hold whole. A TTL of ten
//! minutes keeps the upstream at roughly six requests an hour per instance regardless of
//! traffic. Two requests that both see an expired cache may both fetch; the catalog is
//! replaced as a whole value, so the only cost is a redundant download.
//!
//! ## Failure
//! A failed fetch fails the request with a 500 by default. Set `SERVE_STALE=true` to keep
//! answering from the expired copy while the upstream is down.
//!
//!
//!
//! # Setup
//!
//! Run against the live document.
//! ```sh
//! RUST_LOG=info cargo run
//! ```
//!
//! Run against a local snapshot.
//! ```sh
//! curl -o recipes.json https://www.digitalfarmsystem.com/recipes.json
//! RECIPES_FILE=recipes.json cargo run
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//!
//!
//! # Environment
//!
//! | Variable             | Default                                          |
//! |----------------------|--------------------------------------------------|
//! | `PORT`               | `3000`                                           |
//! | `RECIPES_URL`        | `https://www.digitalfarmsystem.com/recipes.json` |
//! | `RECIPES_FILE`       | unset, read the catalog from this file instead   |
//! | `CACHE_TTL_SECS`     | `600`                                            |
//! | `FETCH_TIMEOUT_SECS` | `10`                                             |
//! | `PAGE_SIZE`          | `9`                                              |
//! | `DEFAULT_LIMIT`      | `5`                                              |
//! | `BYTE_BUDGET`        | `2048`                                           |
//! | `EAGER_LOAD`         | `false`                                          |
//! | `SERVE_STALE`        | `false`                                          |
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod cache;
pub mod config;
pub mod error;
pub mod pagination;
pub mod render;
pub mod routes;
pub mod search;
pub mod state;
pub mod utils;

#[cfg(test)]
mod testing;

use config::Config;
use routes::{
    NAME_PATH, RECIPE_PATH, SEARCH_PATH, health_handler, name_handler, recipe_handler,
    root_handler, search_handler,
};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route(RECIPE_PATH, get(recipe_handler))
        .route(SEARCH_PATH, get(search_handler))
        .route(NAME_PATH, get(name_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config)?;

    if state.config.eager_load {
        if let Err(e) = state.warm().await {
            warn!("Startup catalog load failed, will retry on first request: {e}");
        }
    }

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
