use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use metrics::counter;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::aggregate::{
    self, compare, parse_dimension_list, summarize, trend, DimensionComparison, DimensionOverview,
    SentimentShareReport, Summary, TimeGrain, TrendBucket,
};
use crate::browse::{browse, BrowsePage, ReviewOrder};
use crate::config::DashboardConfig;
use crate::drilldown::{self, DrilldownResult, SubFilter};
use crate::error::Result;
use crate::filter::{FilterQuery, FilteredView};
use crate::keywords::{KeywordExtractor, KeywordReport};
use crate::review::{Dimension, Sentiment};
use crate::store::{export, FacetCatalogue, ReviewStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReviewStore>,
    pub config: Arc<DashboardConfig>,
    pub extractor: Arc<KeywordExtractor>,
}

impl AppState {
    pub fn new(store: Arc<ReviewStore>, config: DashboardConfig) -> Self {
        let extractor = config.keyword_extractor();
        Self {
            store,
            config: Arc::new(config),
            extractor: Arc::new(extractor),
        }
    }

    /// Resolve the caller's filter query into a view over the store.
    fn view(&self, route: &'static str, q: &FilterQuery) -> Result<FilteredView<'_>> {
        counter!("facet_requests_total", "route" => route).increment(1);
        let spec = q.resolve(&self.store, today())?;
        let view = spec.apply(&self.store);
        debug!(route, matched = view.len(), total = self.store.len(), "view resolved");
        Ok(view)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/facets", get(facets))
        .route("/summary", get(summary))
        .route("/trend", get(trend_route))
        .route("/trend/sentiment-share", get(sentiment_share))
        .route("/dimensions", get(dimensions))
        .route("/dimensions/compare", get(dimensions_compare))
        .route("/drilldown", get(drilldown_route))
        .route("/keywords", get(keywords))
        .route("/reviews", get(reviews))
        .route("/export.csv", get(export_csv))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// `crate::api::router` alias used by tests and `app()`.
pub fn router(state: AppState) -> Router {
    create_router(state)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Debug, Default, Deserialize)]
struct GrainParams {
    grain: Option<String>,
}

impl GrainParams {
    fn grain(&self) -> Result<TimeGrain> {
        self.grain
            .as_deref()
            .map(TimeGrain::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CompareParams {
    dims: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DrilldownParams {
    dimension: Option<String>,
    sub: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KeywordParamsQuery {
    subset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BrowseParams {
    order: Option<String>,
}

async fn facets(State(state): State<AppState>) -> Json<FacetCatalogue> {
    counter!("facet_requests_total", "route" => "facets").increment(1);
    Json(state.store.catalogue())
}

async fn summary(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Result<Json<Summary>> {
    let view = state.view("summary", &q)?;
    Ok(Json(summarize(&view)))
}

async fn trend_route(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
    Query(p): Query<GrainParams>,
) -> Result<Json<Vec<TrendBucket>>> {
    let grain = p.grain()?;
    let view = state.view("trend", &q)?;
    Ok(Json(trend(&view, grain)))
}

async fn sentiment_share(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
    Query(p): Query<GrainParams>,
) -> Result<Json<SentimentShareReport>> {
    let grain = p.grain()?;
    let view = state.view("sentiment_share", &q)?;
    Ok(Json(aggregate::sentiment_share_report(&view, grain)))
}

async fn dimensions(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Result<Json<DimensionOverview>> {
    let view = state.view("dimensions", &q)?;
    Ok(Json(aggregate::dimension_overview(&view)))
}

async fn dimensions_compare(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
    Query(p): Query<CompareParams>,
) -> Result<Json<Vec<DimensionComparison>>> {
    let dims = parse_dimension_list(p.dims.as_deref().unwrap_or_default())?;
    let view = state.view("dimensions_compare", &q)?;
    Ok(Json(compare(&view, &dims)?))
}

async fn drilldown_route(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
    Query(p): Query<DrilldownParams>,
) -> Result<Json<DrilldownResult>> {
    let dimension = Dimension::parse(p.dimension.as_deref().unwrap_or_default())?;
    let sub = p
        .sub
        .as_deref()
        .map(SubFilter::parse)
        .transpose()?
        .unwrap_or_default();
    let view = state.view("drilldown", &q)?;
    Ok(Json(drilldown::run(
        &view,
        dimension,
        sub,
        state.config.drilldown_limits(),
    )))
}

/// `all` (or absent) keeps every review; otherwise one overall sentiment.
fn parse_subset(raw: Option<&str>) -> Result<Option<Sentiment>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => Sentiment::parse(s).map(Some),
    }
}

async fn keywords(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
    Query(p): Query<KeywordParamsQuery>,
) -> Result<Json<KeywordReport>> {
    let subset = parse_subset(p.subset.as_deref())?;
    let view = state.view("keywords", &q)?;
    Ok(Json(state.extractor.analyze(&view, subset)))
}

async fn reviews(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
    Query(p): Query<BrowseParams>,
) -> Result<Json<BrowsePage>> {
    let order = p
        .order
        .as_deref()
        .map(ReviewOrder::parse)
        .transpose()?
        .unwrap_or_default();
    let view = state.view("reviews", &q)?;
    Ok(Json(browse(&view, order, state.config.browse.rows)))
}

async fn export_csv(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Result<Response> {
    let view = state.view("export", &q)?;
    let bytes = export::to_csv_bytes(&view)?;
    let name = export::export_file_name(today());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
