//! Per-dimension scoring: the mean-score table (with radar and bar-ranking
//! views of it) and the caller-ordered multi-dimension comparison.
//!
//! Absent scores are skipped, never treated as 0. A dimension nobody
//! discussed has an undefined mean (`None`, `null` on the wire).

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{DashboardError, Result};
use crate::filter::FilteredView;
use crate::review::Dimension;

pub const MIN_COMPARE: usize = 2;

/// Running tally of the present scores of one dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ScoreStats {
    pub present: usize,
    pub sum: f64,
    pub positive: usize,
}

impl ScoreStats {
    pub fn collect(view: &FilteredView<'_>, d: Dimension) -> Self {
        let mut st = Self::default();
        for s in view.iter().filter_map(|r| r.score(d)) {
            st.present += 1;
            st.sum += s;
            if s > 0.0 {
                st.positive += 1;
            }
        }
        st
    }

    pub fn mean(&self) -> Option<f64> {
        (self.present > 0).then(|| self.sum / self.present as f64)
    }

    /// 0.0 when nothing is present.
    pub fn positive_rate(&self) -> f64 {
        if self.present == 0 {
            0.0
        } else {
            100.0 * self.positive as f64 / self.present as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub mean: Option<f64>,
    pub present: usize,
}

/// One row per dimension, canonical order, undefined rows included.
pub fn mean_score_table(view: &FilteredView<'_>) -> Vec<DimensionScore> {
    Dimension::ALL
        .into_iter()
        .map(|d| {
            let st = ScoreStats::collect(view, d);
            DimensionScore {
                dimension: d,
                mean: st.mean(),
                present: st.present,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarPoint {
    pub dimension: Dimension,
    pub mean: f64,
}

/// Radar input: undefined rows dropped, ascending by mean (the order the
/// bar chart uses, so both charts list dimensions alike).
pub fn radar(table: &[DimensionScore]) -> Vec<RadarPoint> {
    bar_ranking(table)
        .into_iter()
        .filter_map(|row| {
            row.mean.map(|mean| RadarPoint {
                dimension: row.dimension,
                mean,
            })
        })
        .collect()
}

/// Ascending by mean for a horizontal bar layout. Undefined rows stay
/// visible and sort after every defined one.
pub fn bar_ranking(table: &[DimensionScore]) -> Vec<DimensionScore> {
    let mut rows = table.to_vec();
    rows.sort_by(|a, b| match (a.mean, b.mean) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionComparison {
    pub dimension: Dimension,
    pub mean_score: Option<f64>,
    /// Percent of present scores that are > 0; 0.0 when `present_count` is 0.
    pub positive_rate: f64,
    pub present_count: usize,
}

/// Compare a caller-chosen subset of dimensions, in the caller's order.
pub fn compare(view: &FilteredView<'_>, dims: &[Dimension]) -> Result<Vec<DimensionComparison>> {
    let distinct: HashSet<Dimension> = dims.iter().copied().collect();
    if distinct.len() != dims.len() || dims.len() < MIN_COMPARE {
        let given = dims.iter().map(|d| d.label()).collect::<Vec<_>>().join(", ");
        return Err(DashboardError::invalid_facet(
            "dimensions",
            given,
            format!("at least {MIN_COMPARE} distinct dimensions"),
        ));
    }

    Ok(dims
        .iter()
        .map(|&d| {
            let st = ScoreStats::collect(view, d);
            DimensionComparison {
                dimension: d,
                mean_score: st.mean(),
                positive_rate: st.positive_rate(),
                present_count: st.present,
            }
        })
        .collect())
}

/// `Location,Value` / `location, food_beverage` → dimensions, order kept.
pub fn parse_dimension_list(raw: &str) -> Result<Vec<Dimension>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Dimension::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::Sentiment;
    use crate::store::testutil::*;

    fn sample() -> crate::store::ReviewStore {
        store(vec![
            with_score(
                with_score(
                    review(0, "2024-01-01", 5.0, Sentiment::Positive),
                    Dimension::StaffService,
                    0.8,
                    None,
                ),
                Dimension::Location,
                -0.5,
                None,
            ),
            with_score(
                review(1, "2024-01-02", 3.0, Sentiment::Neutral),
                Dimension::StaffService,
                0.0,
                None,
            ),
            with_score(
                review(2, "2024-01-03", 1.0, Sentiment::Negative),
                Dimension::StaffService,
                -0.2,
                None,
            ),
        ])
    }

    #[test]
    fn table_skips_absent_and_leaves_undiscussed_undefined() {
        let s = sample();
        let t = mean_score_table(&FilteredView::all(&s));
        assert_eq!(t.len(), 7);
        let staff = &t[Dimension::StaffService.index()];
        assert_eq!(staff.present, 3);
        assert!((staff.mean.unwrap() - 0.2).abs() < 1e-9);
        let loc = &t[Dimension::Location.index()];
        assert_eq!(loc.present, 1);
        assert_eq!(loc.mean, Some(-0.5));
        let value = &t[Dimension::Value.index()];
        assert_eq!(value.present, 0);
        assert_eq!(value.mean, None);
    }

    #[test]
    fn radar_drops_undefined_ranking_keeps_them_last() {
        let s = sample();
        let t = mean_score_table(&FilteredView::all(&s));
        let r = radar(&t);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].dimension, Dimension::Location);

        let ranked = bar_ranking(&t);
        assert_eq!(ranked.len(), 7);
        assert_eq!(ranked[0].dimension, Dimension::Location);
        assert_eq!(ranked[1].dimension, Dimension::StaffService);
        assert!(ranked[2..].iter().all(|row| row.mean.is_none()));
    }

    #[test]
    fn comparison_keeps_caller_order_and_rates() {
        let s = sample();
        let v = FilteredView::all(&s);
        let out = compare(&v, &[Dimension::Value, Dimension::StaffService]).unwrap();
        assert_eq!(out[0].dimension, Dimension::Value);
        assert_eq!(out[0].present_count, 0);
        assert_eq!(out[0].positive_rate, 0.0);
        assert_eq!(out[0].mean_score, None);
        assert_eq!(out[1].present_count, 3);
        assert!((out[1].positive_rate - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn comparison_needs_two_distinct_dimensions() {
        let s = sample();
        let v = FilteredView::all(&s);
        assert!(compare(&v, &[Dimension::Value]).unwrap_err().is_invalid_facet());
        assert!(compare(&v, &[Dimension::Value, Dimension::Value])
            .unwrap_err()
            .is_invalid_facet());
    }

    #[test]
    fn dimension_list_parsing() {
        let dims = parse_dimension_list("Value, staff_service").unwrap();
        assert_eq!(dims, vec![Dimension::Value, Dimension::StaffService]);
        assert!(parse_dimension_list("Value,Spa").is_err());
    }
}
