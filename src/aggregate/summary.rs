//! Headline KPIs and the star / sentiment distributions of a filtered view.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::filter::FilteredView;
use crate::review::{Sentiment, Star};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total: usize,
    pub store_total: usize,
    /// Undefined for an empty view.
    pub mean_star: Option<f64>,
    pub positive_pct: f64,
    pub negative_pct: f64,
    /// Days between the earliest and latest review in the view.
    pub date_span_days: Option<i64>,
}

pub fn overview(view: &FilteredView<'_>) -> Overview {
    let n = view.len();
    let count = |s: Sentiment| view.iter().filter(|r| r.sentiment == s).count();
    let pct = |c: usize| {
        if n == 0 {
            0.0
        } else {
            100.0 * c as f64 / n as f64
        }
    };

    let mean_star =
        (n > 0).then(|| view.iter().map(|r| r.star.value()).sum::<f64>() / n as f64);

    let first = view.iter().map(|r| r.date).min();
    let last = view.iter().map(|r| r.date).max();
    let date_span_days = first.zip(last).map(|(a, b)| (b - a).num_days());

    Overview {
        total: n,
        store_total: view.store_total(),
        mean_star,
        positive_pct: pct(count(Sentiment::Positive)),
        negative_pct: pct(count(Sentiment::Negative)),
        date_span_days,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarCount {
    pub star: Star,
    pub count: usize,
}

/// Ascending by star; only stars that occur.
pub fn star_distribution(view: &FilteredView<'_>) -> Vec<StarCount> {
    let mut by_star: BTreeMap<Star, usize> = BTreeMap::new();
    for r in view.iter() {
        *by_star.entry(r.star).or_default() += 1;
    }
    by_star
        .into_iter()
        .map(|(star, count)| StarCount { star, count })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentCount {
    pub sentiment: Sentiment,
    pub count: usize,
}

/// Always three rows: negative, neutral, positive.
pub fn sentiment_distribution(view: &FilteredView<'_>) -> Vec<SentimentCount> {
    Sentiment::ALL
        .into_iter()
        .map(|s| SentimentCount {
            sentiment: s,
            count: view.iter().filter(|r| r.sentiment == s).count(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub overview: Overview,
    pub stars: Vec<StarCount>,
    pub sentiments: Vec<SentimentCount>,
}

pub fn summarize(view: &FilteredView<'_>) -> Summary {
    Summary {
        overview: overview(view),
        stars: star_distribution(view),
        sentiments: sentiment_distribution(view),
    }
}
