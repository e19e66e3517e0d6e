//! # Filter Engine
//! Conjunctive facet predicate (date range ∧ star set ∧ sentiment set)
//! applied in a single pass over the store. The result is a borrowed view:
//! references into the store, never copies.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::review::{Review, Sentiment, Star};
use crate::store::ReviewStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    /// Inclusive.
    pub start: NaiveDate,
    /// Inclusive.
    pub end: NaiveDate,
    pub stars: BTreeSet<Star>,
    pub sentiments: BTreeSet<Sentiment>,
}

impl FilterSpec {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        stars: impl IntoIterator<Item = Star>,
        sentiments: impl IntoIterator<Item = Sentiment>,
    ) -> Self {
        Self {
            start,
            end,
            stars: stars.into_iter().collect(),
            sentiments: sentiments.into_iter().collect(),
        }
    }

    /// The "no filter" spec: full date range, every star present, every sentiment.
    pub fn everything(store: &ReviewStore) -> Self {
        let (start, end) = store
            .date_bounds()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        Self::new(start, end, store.star_options(), Sentiment::ALL)
    }

    pub fn matches(&self, r: &Review) -> bool {
        self.start <= r.date
            && r.date <= self.end
            && self.stars.contains(&r.star)
            && self.sentiments.contains(&r.sentiment)
    }

    pub fn apply<'a>(&self, store: &'a ReviewStore) -> FilteredView<'a> {
        apply(store, self)
    }
}

/// Single O(n) pass. Empty star/sentiment sets simply yield an empty view.
pub fn apply<'a>(store: &'a ReviewStore, spec: &FilterSpec) -> FilteredView<'a> {
    let reviews: Vec<&Review> = store.reviews().iter().filter(|r| spec.matches(r)).collect();
    debug!(
        kept = reviews.len(),
        total = store.len(),
        start = %spec.start,
        end = %spec.end,
        "filter applied"
    );
    FilteredView {
        reviews,
        store_total: store.len(),
    }
}

/// Read-only slice of the store. Order follows store order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    reviews: Vec<&'a Review>,
    store_total: usize,
}

impl<'a> FilteredView<'a> {
    /// Unfiltered view over the whole store.
    pub fn all(store: &'a ReviewStore) -> Self {
        Self {
            reviews: store.reviews().iter().collect(),
            store_total: store.len(),
        }
    }

    pub fn reviews(&self) -> &[&'a Review] {
        &self.reviews
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Review> + '_ {
        self.reviews.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Size of the store the view was taken from.
    pub fn store_total(&self) -> usize {
        self.store_total
    }

    /// Further narrowing; keeps borrowing the same store.
    pub fn narrow(&self, keep: impl Fn(&Review) -> bool) -> FilteredView<'a> {
        FilteredView {
            reviews: self.reviews.iter().copied().filter(|r| keep(r)).collect(),
            store_total: self.store_total,
        }
    }

    /// `None` keeps everything.
    pub fn with_sentiment(&self, sentiment: Option<Sentiment>) -> FilteredView<'a> {
        match sentiment {
            Some(s) => self.narrow(|r| r.sentiment == s),
            None => self.clone(),
        }
    }
}

/// Quick time-range choices offered next to the custom date picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimePreset {
    #[default]
    Custom,
    Last30Days,
    Last3Months,
    Last6Months,
    LastYear,
    ThisYear,
    All,
}

impl TimePreset {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "custom" | "" => Ok(TimePreset::Custom),
            "last_30_days" => Ok(TimePreset::Last30Days),
            "last_3_months" => Ok(TimePreset::Last3Months),
            "last_6_months" => Ok(TimePreset::Last6Months),
            "last_year" => Ok(TimePreset::LastYear),
            "this_year" => Ok(TimePreset::ThisYear),
            "all" => Ok(TimePreset::All),
            other => Err(DashboardError::invalid_facet(
                "preset",
                other,
                "custom, last_30_days, last_3_months, last_6_months, last_year, this_year, all",
            )),
        }
    }

    /// Resolve to an inclusive range. Relative presets are clamped to the
    /// earliest review and always end at the latest review.
    pub fn range(
        self,
        bounds: (NaiveDate, NaiveDate),
        today: NaiveDate,
        custom: (Option<NaiveDate>, Option<NaiveDate>),
    ) -> (NaiveDate, NaiveDate) {
        let (min, max) = bounds;
        let back = |days: i64| (today - Duration::days(days)).max(min);
        match self {
            TimePreset::Custom => (custom.0.unwrap_or(min), custom.1.unwrap_or(max)),
            TimePreset::Last30Days => (back(30), max),
            TimePreset::Last3Months => (back(90), max),
            TimePreset::Last6Months => (back(180), max),
            TimePreset::LastYear => (back(365), max),
            TimePreset::ThisYear => {
                let jan1 = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(min);
                (jan1.max(min), max)
            }
            TimePreset::All => (min, max),
        }
    }
}

/// Raw caller input, straight from a query string. Everything is optional:
/// an absent facet means "all values", a present-but-empty one means "none".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub preset: Option<String>,
    /// Comma separated, e.g. `4,4.5,5`.
    pub stars: Option<String>,
    /// Comma separated names or codes, e.g. `positive,neutral` or `1,0`.
    pub sentiments: Option<String>,
}

impl FilterQuery {
    /// Validate and turn into a `FilterSpec`. Unknown facet values are
    /// rejected rather than silently matching nothing.
    pub fn resolve(&self, store: &ReviewStore, today: NaiveDate) -> Result<FilterSpec> {
        let bounds = store
            .date_bounds()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        let preset = self
            .preset
            .as_deref()
            .map(TimePreset::parse)
            .transpose()?
            .unwrap_or_default();
        let custom = (
            parse_query_date("start", self.start.as_deref())?,
            parse_query_date("end", self.end.as_deref())?,
        );
        let (start, end) = preset.range(bounds, today, custom);

        let stars = match self.stars.as_deref() {
            None => store.star_options().into_iter().collect(),
            Some(raw) => split_list(raw)
                .map(Star::parse)
                .collect::<Result<BTreeSet<_>>>()?,
        };
        let sentiments = match self.sentiments.as_deref() {
            None => Sentiment::ALL.into_iter().collect(),
            Some(raw) => split_list(raw)
                .map(Sentiment::parse)
                .collect::<Result<BTreeSet<_>>>()?,
        };

        Ok(FilterSpec {
            start,
            end,
            stars,
            sentiments,
        })
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_query_date(facet: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) => NaiveDate::parse_from_str(t, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| DashboardError::invalid_facet(facet, t, "a date formatted YYYY-MM-DD")),
    }
}
