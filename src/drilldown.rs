//! # Dimension Drilldown
//! Narrow a filtered view to the reviews that scored one dimension, classify
//! them by the sign of that score (independent of the review's overall
//! sentiment), sub-filter by that class and pick the newest for display.
//!
//! Flow: scope → KPIs → classification → sub-filter → selection.
//! An empty scope is terminal (`DrilldownResult::NoData`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::dimensions::ScoreStats;
use crate::error::{DashboardError, Result};
use crate::filter::FilteredView;
use crate::review::{Dimension, Review, Star};

pub const NO_REASON_PLACEHOLDER: &str = "no related comment";
pub const DEFAULT_TABLE_ROWS: usize = 10;
pub const DEFAULT_DETAIL_ROWS: usize = 5;

/// Above/below these means the dimension reads as pleased/displeased.
const MOOD_BAND: f64 = 0.3;

/// Sign of a single dimension score. 0 is neutral, never lumped with either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreClass {
    Positive,
    Neutral,
    Negative,
}

impl ScoreClass {
    pub fn of(score: f64) -> Self {
        if score > 0.0 {
            ScoreClass::Positive
        } else if score < 0.0 {
            ScoreClass::Negative
        } else {
            ScoreClass::Neutral
        }
    }
}

/// Caller's choice of which class to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubFilter {
    #[default]
    All,
    Positive,
    Neutral,
    Negative,
}

impl SubFilter {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(SubFilter::All),
            "positive" => Ok(SubFilter::Positive),
            "neutral" => Ok(SubFilter::Neutral),
            "negative" => Ok(SubFilter::Negative),
            other => Err(DashboardError::invalid_facet(
                "sub-filter",
                other,
                "all, positive, neutral, negative",
            )),
        }
    }

    pub fn admits(self, class: ScoreClass) -> bool {
        match self {
            SubFilter::All => true,
            SubFilter::Positive => class == ScoreClass::Positive,
            SubFilter::Neutral => class == ScoreClass::Neutral,
            SubFilter::Negative => class == ScoreClass::Negative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Pleased,
    Mixed,
    Displeased,
}

impl Mood {
    pub fn of(mean: f64) -> Self {
        if mean > MOOD_BAND {
            Mood::Pleased
        } else if mean < -MOOD_BAND {
            Mood::Displeased
        } else {
            Mood::Mixed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionKpis {
    pub count: usize,
    pub mean_score: f64,
    pub positive_rate: f64,
    pub mood: Mood,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClassBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl ClassBreakdown {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrilldownRow {
    pub id: u64,
    pub date: NaiveDate,
    pub author: String,
    pub star: Star,
    pub score: f64,
    pub class: ScoreClass,
    /// The dimension's excerpt, or the placeholder when there is none.
    pub reason: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    #[serde(flatten)]
    pub row: DrilldownRow,
    /// `author - YYYY-MM-DD - N stars - score S.SS`
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionReport {
    pub dimension: Dimension,
    pub kpis: DimensionKpis,
    pub breakdown: ClassBreakdown,
    pub sub_filter: SubFilter,
    /// Size of the sub-filtered scope, before the top-N cut.
    pub matching: usize,
    pub table: Vec<DrilldownRow>,
    pub detail: Vec<DetailRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DrilldownResult {
    NoData { dimension: Dimension },
    Ready(Box<DimensionReport>),
}

impl DrilldownResult {
    pub fn report(&self) -> Option<&DimensionReport> {
        match self {
            DrilldownResult::Ready(r) => Some(r),
            DrilldownResult::NoData { .. } => None,
        }
    }
}

/// Row limits for the two display selections.
#[derive(Debug, Clone, Copy)]
pub struct DrilldownLimits {
    pub table_rows: usize,
    pub detail_rows: usize,
}

impl Default for DrilldownLimits {
    fn default() -> Self {
        Self {
            table_rows: DEFAULT_TABLE_ROWS,
            detail_rows: DEFAULT_DETAIL_ROWS,
        }
    }
}

/// Scope: reviews in the view with a present score for `d`.
pub fn scope<'a>(view: &FilteredView<'a>, d: Dimension) -> FilteredView<'a> {
    view.narrow(|r| r.score(d).is_some())
}

pub fn run(
    view: &FilteredView<'_>,
    dimension: Dimension,
    sub_filter: SubFilter,
    limits: DrilldownLimits,
) -> DrilldownResult {
    let dim_scope = scope(view, dimension);
    if dim_scope.is_empty() {
        return DrilldownResult::NoData { dimension };
    }

    let stats = ScoreStats::collect(&dim_scope, dimension);
    let mean_score = stats.mean().unwrap_or_default();
    let kpis = DimensionKpis {
        count: stats.present,
        mean_score,
        positive_rate: stats.positive_rate(),
        mood: Mood::of(mean_score),
    };

    let mut breakdown = ClassBreakdown::default();
    let mut selected: Vec<(&Review, f64, ScoreClass)> = Vec::new();
    for r in dim_scope.iter() {
        let Some(score) = r.score(dimension) else {
            continue;
        };
        let class = ScoreClass::of(score);
        match class {
            ScoreClass::Positive => breakdown.positive += 1,
            ScoreClass::Neutral => breakdown.neutral += 1,
            ScoreClass::Negative => breakdown.negative += 1,
        }
        if sub_filter.admits(class) {
            selected.push((r, score, class));
        }
    }

    // Stable: same-day reviews keep store order.
    selected.sort_by(|a, b| b.0.date.cmp(&a.0.date));
    let matching = selected.len();

    let rows: Vec<DrilldownRow> = selected
        .iter()
        .take(limits.table_rows.max(limits.detail_rows))
        .map(|&(r, score, class)| DrilldownRow {
            id: r.id,
            date: r.date,
            author: r.author.clone(),
            star: r.star,
            score,
            class,
            reason: r
                .reason(dimension)
                .unwrap_or(NO_REASON_PLACEHOLDER)
                .to_string(),
            text: r.text.clone(),
        })
        .collect();

    let detail = rows
        .iter()
        .take(limits.detail_rows)
        .map(|row| DetailRow {
            label: detail_label(row),
            row: row.clone(),
        })
        .collect();
    let table = rows.into_iter().take(limits.table_rows).collect();

    DrilldownResult::Ready(Box::new(DimensionReport {
        dimension,
        kpis,
        breakdown,
        sub_filter,
        matching,
        table,
        detail,
    }))
}

/// Star is shown without decimals here only; KPIs keep the exact value.
fn detail_label(row: &DrilldownRow) -> String {
    format!(
        "{} - {} - {:.0} stars - score {:.2}",
        row.author,
        row.date.format("%Y-%m-%d"),
        row.star.value(),
        row.score
    )
}
