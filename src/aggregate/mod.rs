// src/aggregate/mod.rs
//! Aggregator entry: time-bucketed trends, dimension scoring and the
//! overview KPIs. Everything here is a pure function of a `FilteredView`.

pub mod dimensions;
pub mod summary;
pub mod trend;

// Re-export convenient types.
pub use crate::aggregate::dimensions::{
    bar_ranking, compare, mean_score_table, parse_dimension_list, radar, DimensionComparison,
    DimensionScore, RadarPoint, MIN_COMPARE,
};
pub use crate::aggregate::summary::{summarize, Overview, SentimentCount, StarCount, Summary};
pub use crate::aggregate::trend::{
    share_averages, sentiment_share, trend, SentimentShare, ShareAverages, TimeGrain, TrendBucket,
};

use serde::Serialize;

use crate::filter::FilteredView;

/// Everything the dimension overview panel needs in one go.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionOverview {
    pub table: Vec<DimensionScore>,
    pub ranking: Vec<DimensionScore>,
    pub radar: Vec<RadarPoint>,
}

pub fn dimension_overview(view: &FilteredView<'_>) -> DimensionOverview {
    let table = mean_score_table(view);
    DimensionOverview {
        ranking: bar_ranking(&table),
        radar: radar(&table),
        table,
    }
}

/// Sentiment share per bucket plus the per-category period averages.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentShareReport {
    pub buckets: Vec<SentimentShare>,
    pub averages: ShareAverages,
}

pub fn sentiment_share_report(view: &FilteredView<'_>, grain: TimeGrain) -> SentimentShareReport {
    let buckets = sentiment_share(view, grain);
    SentimentShareReport {
        averages: share_averages(&buckets),
        buckets,
    }
}
