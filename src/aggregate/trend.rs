//! Time-bucketed rollups: star/sentiment trend and sentiment share per bucket.
//! Only buckets with at least one review exist; gaps are not zero-filled.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{DashboardError, Result};
use crate::filter::FilteredView;
use crate::review::{Review, Sentiment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrain {
    #[default]
    Month,
    Year,
}

impl TimeGrain {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "month" | "monthly" => Ok(TimeGrain::Month),
            "year" | "yearly" => Ok(TimeGrain::Year),
            other => Err(DashboardError::invalid_facet("grain", other, "month, year")),
        }
    }

    pub fn key(self, r: &Review) -> BucketKey {
        BucketKey {
            year: r.year(),
            month: match self {
                TimeGrain::Month => Some(r.month()),
                TimeGrain::Year => None,
            },
        }
    }
}

/// Orders chronologically; renders as `2024` or `2024-03`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub year: i32,
    pub month: Option<u32>,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(m) => write!(f, "{:04}-{:02}", self.year, m),
            None => write!(f, "{:04}", self.year),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendBucket {
    pub bucket: String,
    pub count: usize,
    pub mean_star: f64,
    pub mean_sentiment: f64,
}

/// Per bucket `{count, mean(star), mean(sentiment)}`, chronological.
pub fn trend(view: &FilteredView<'_>, grain: TimeGrain) -> Vec<TrendBucket> {
    #[derive(Default)]
    struct Acc {
        n: usize,
        star: f64,
        sentiment: f64,
    }

    let mut groups: BTreeMap<BucketKey, Acc> = BTreeMap::new();
    for r in view.iter() {
        let acc = groups.entry(grain.key(r)).or_default();
        acc.n += 1;
        acc.star += r.star.value();
        acc.sentiment += f64::from(r.sentiment.value());
    }

    // every group has n >= 1, so the means are defined
    groups
        .into_iter()
        .map(|(k, a)| TrendBucket {
            bucket: k.to_string(),
            count: a.n,
            mean_star: a.star / a.n as f64,
            mean_sentiment: a.sentiment / a.n as f64,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CategoryCounts {
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
}

impl CategoryCounts {
    fn bump(&mut self, s: Sentiment) {
        match s {
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Positive => self.positive += 1,
        }
    }

    pub fn get(&self, s: Sentiment) -> usize {
        match s {
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Positive => self.positive,
        }
    }

    pub fn total(&self) -> usize {
        self.negative + self.neutral + self.positive
    }
}

/// Percent of the bucket per sentiment, rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentShare {
    pub bucket: String,
    pub total: usize,
    pub counts: CategoryCounts,
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl SentimentShare {
    pub fn get(&self, s: Sentiment) -> f64 {
        match s {
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Positive => self.positive,
        }
    }

    /// 100.0 give or take one rounding step.
    pub fn sum(&self) -> f64 {
        self.negative + self.neutral + self.positive
    }
}

pub fn sentiment_share(view: &FilteredView<'_>, grain: TimeGrain) -> Vec<SentimentShare> {
    let mut groups: BTreeMap<BucketKey, CategoryCounts> = BTreeMap::new();
    for r in view.iter() {
        groups.entry(grain.key(r)).or_default().bump(r.sentiment);
    }

    groups
        .into_iter()
        .map(|(k, c)| {
            let total = c.total();
            let pct = |n: usize| round1(100.0 * n as f64 / total as f64);
            SentimentShare {
                bucket: k.to_string(),
                total,
                counts: c,
                negative: pct(c.negative),
                neutral: pct(c.neutral),
                positive: pct(c.positive),
            }
        })
        .collect()
}

/// Mean share per category over the buckets where the category occurs at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShareAverages {
    pub negative: Option<f64>,
    pub neutral: Option<f64>,
    pub positive: Option<f64>,
}

pub fn share_averages(shares: &[SentimentShare]) -> ShareAverages {
    let avg = |s: Sentiment| {
        let present: Vec<f64> = shares
            .iter()
            .filter(|b| b.counts.get(s) > 0)
            .map(|b| b.get(s))
            .collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        }
    };
    ShareAverages {
        negative: avg(Sentiment::Negative),
        neutral: avg(Sentiment::Neutral),
        positive: avg(Sentiment::Positive),
    }
}

pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
