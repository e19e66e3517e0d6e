//! # Review Store
//! Immutable in-memory snapshot of every review. Built once by the loader,
//! shared behind an `Arc`, never mutated afterwards. All analysis works on
//! borrowed views into it.

pub mod cache;
pub mod export;
pub mod loader;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::review::{Dimension, Review, Sentiment, Star};

pub use cache::{load_cached, SnapshotKey, StoreCache};
pub use loader::{load_csv, read_reviews, REQUIRED_BASE_COLUMNS};

#[derive(Debug)]
pub struct ReviewStore {
    source: String,
    reviews: Vec<Review>,
}

/// What the sidebar needs to offer as filter choices.
#[derive(Debug, Clone, Serialize)]
pub struct FacetCatalogue {
    pub total: usize,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub stars: Vec<Star>,
    pub sentiments: Vec<Sentiment>,
    pub dimensions: Vec<Dimension>,
}

impl ReviewStore {
    pub fn from_reviews(source: impl Into<String>, reviews: Vec<Review>) -> Self {
        Self {
            source: source.into(),
            reviews,
        }
    }

    /// Label of the snapshot this store was built from (usually the file path).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == id)
    }

    /// Earliest and latest review date; `None` for an empty store.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.reviews.iter().map(|r| r.date).min()?;
        let max = self.reviews.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// Distinct star values present in the data, ascending.
    pub fn star_options(&self) -> Vec<Star> {
        self.reviews
            .iter()
            .map(|r| r.star)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn catalogue(&self) -> FacetCatalogue {
        let bounds = self.date_bounds();
        FacetCatalogue {
            total: self.len(),
            min_date: bounds.map(|b| b.0),
            max_date: bounds.map(|b| b.1),
            stars: self.star_options(),
            sentiments: Sentiment::ALL.to_vec(),
            dimensions: Dimension::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    //! Small builders shared by unit tests across the crate.
    use super::*;
    use crate::review::DIMENSION_COUNT;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
    }

    pub fn review(id: u64, day: &str, star: f64, sentiment: Sentiment) -> Review {
        Review {
            id,
            date: date(day),
            author: format!("guest-{id}"),
            star: Star::new(star).expect("test star"),
            sentiment,
            text: String::new(),
            scores: [None; DIMENSION_COUNT],
            reasons: Default::default(),
        }
    }

    pub fn with_score(mut r: Review, d: Dimension, score: f64, reason: Option<&str>) -> Review {
        r.scores[d.index()] = Some(score);
        r.reasons[d.index()] = reason.map(str::to_string);
        r
    }

    pub fn with_text(mut r: Review, text: &str) -> Review {
        r.text = text.to_string();
        r
    }

    pub fn store(reviews: Vec<Review>) -> ReviewStore {
        ReviewStore::from_reviews("test", reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;

    #[test]
    fn bounds_and_star_options() {
        let s = store(vec![
            review(0, "2024-03-05", 5.0, Sentiment::Positive),
            review(1, "2023-12-31", 3.5, Sentiment::Neutral),
            review(2, "2024-01-10", 5.0, Sentiment::Negative),
        ]);
        assert_eq!(
            s.date_bounds(),
            Some((date("2023-12-31"), date("2024-03-05")))
        );
        let stars: Vec<f64> = s.star_options().into_iter().map(Star::value).collect();
        assert_eq!(stars, vec![3.5, 5.0]);
        assert_eq!(s.get(2).map(|r| r.sentiment), Some(Sentiment::Negative));
    }

    #[test]
    fn empty_store_has_no_bounds() {
        let s = store(Vec::new());
        assert!(s.is_empty());
        assert_eq!(s.date_bounds(), None);
        let c = s.catalogue();
        assert_eq!(c.total, 0);
        assert_eq!(c.dimensions.len(), 7);
    }
}
