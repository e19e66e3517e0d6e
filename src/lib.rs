// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod api;
pub mod browse;
pub mod config;
pub mod drilldown;
pub mod error;
pub mod filter;
pub mod keywords;
pub mod metrics;
pub mod review;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::DashboardConfig;
pub use crate::error::{DashboardError, Result};
pub use crate::filter::{FilterQuery, FilterSpec, FilteredView, TimePreset};
pub use crate::review::{Dimension, Review, Sentiment, Star};
pub use crate::store::ReviewStore;

use anyhow::Context;
use axum::Router;
use tracing::info;

/// Build the full application router: config, cached store, routes, and
/// `/metrics` when debug routes are enabled.
pub async fn app() -> anyhow::Result<Router> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let config = DashboardConfig::load_default().context("loading dashboard config")?;

    // Recorder first, so the initial snapshot load is counted.
    let metrics = if config.debug_routes {
        Some(metrics::Metrics::init()?)
    } else {
        None
    };

    let path = config.data_path.clone();
    let store = tokio::task::spawn_blocking(move || store::load_cached(&path))
        .await
        .context("store loader task panicked")?
        .with_context(|| format!("loading reviews from {}", config.data_path.display()))?;
    info!(
        reviews = store.len(),
        source = store.source(),
        debug_routes = config.debug_routes,
        "review store ready"
    );

    let state = AppState::new(store, config);
    let mut router = api::create_router(state);
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }
    Ok(router)
}
