use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Only the first call per process
    /// installs; later calls share the same handle.
    pub fn init() -> Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new()
                    .install_recorder()
                    .context("prometheus: install recorder")?;
                describe();
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("store_loads_total", "Review snapshots parsed from disk");
    describe_counter!("store_cache_hits_total", "Snapshot loads served from the memo cache");
    describe_counter!("facet_requests_total", "Analytics requests by route");
    describe_counter!("facet_rejections_total", "Requests rejected for invalid facet values");
    describe_gauge!("store_reviews", "Reviews in the most recently loaded snapshot");
    describe_histogram!("keyword_extract_ms", "Keyword extraction wall time in milliseconds");
}
