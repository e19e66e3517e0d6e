// src/keywords/mod.rs
//! Keyword frequency over free text without a linguistic segmenter.
//!
//! Pipeline: concatenate texts → normalize (punctuation to spaces, digit runs
//! removed) → every character window of length 2..=4 → exact-string counts →
//! stop words dropped → frequency threshold → rank.
//!
//! Windows overlap and nest on purpose (a 2-gram and the 3-gram containing it
//! are both counted): this is term discovery, not segmentation. A real
//! segmenter can replace the window scan through `CandidateSource`.
//!
//! Ranking: frequency descending, ties by lexicographic term order.

pub mod stopwords;

pub use stopwords::Stopwords;

use metrics::histogram;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

use crate::filter::FilteredView;
use crate::review::Sentiment;

pub const DEFAULT_MIN_FREQUENCY: usize = 3;
pub const DEFAULT_MIN_WINDOW: usize = 2;
pub const DEFAULT_MAX_WINDOW: usize = 4;
pub const DEFAULT_TOP_N: usize = 30;
pub const DEFAULT_CHART_N: usize = 20;

static RE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("punct regex"));
static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit regex"));

/// Punctuation/symbols become spaces, digit runs vanish.
pub fn normalize(text: &str) -> String {
    let spaced = RE_PUNCT.replace_all(text, " ");
    RE_DIGITS.replace_all(&spaced, "").into_owned()
}

/// Produces candidate terms from normalized text.
pub trait CandidateSource: Send + Sync {
    fn for_each_candidate<'t>(&self, normalized: &'t str, emit: &mut dyn FnMut(&'t str));
}

/// Sliding character windows of every length in `min..=max`, trimmed.
/// Trimmed candidates shorter than `min` characters are discarded.
#[derive(Debug, Clone, Copy)]
pub struct WindowScan {
    pub min: usize,
    pub max: usize,
}

impl Default for WindowScan {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_WINDOW,
            max: DEFAULT_MAX_WINDOW,
        }
    }
}

impl CandidateSource for WindowScan {
    fn for_each_candidate<'t>(&self, normalized: &'t str, emit: &mut dyn FnMut(&'t str)) {
        // Byte offset of every char boundary, including the end.
        let bounds: Vec<usize> = normalized
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(normalized.len()))
            .collect();
        let n_chars = bounds.len() - 1;

        for w in self.min.max(1)..=self.max {
            if w > n_chars {
                break;
            }
            for i in 0..=(n_chars - w) {
                let cand = normalized[bounds[i]..bounds[i + w]].trim();
                if !cand.is_empty() && cand.chars().count() >= self.min {
                    emit(cand);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordParams {
    pub min_frequency: usize,
    pub top_n: usize,
    pub chart_n: usize,
}

impl Default for KeywordParams {
    fn default() -> Self {
        Self {
            min_frequency: DEFAULT_MIN_FREQUENCY,
            top_n: DEFAULT_TOP_N,
            chart_n: DEFAULT_CHART_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum KeywordReport {
    /// The subset was empty, or none of its reviews carried any text.
    /// Whitespace-only text counts as text.
    NoText { reviews: usize },
    /// There was text, but no term reached the frequency threshold.
    InsufficientVocabulary { reviews: usize, min_frequency: usize },
    Ranked {
        reviews: usize,
        /// Frequency descending.
        top: Vec<KeywordCount>,
        /// The highest `chart_n` of `top`, ascending, for a horizontal bar
        /// layout with the most frequent term at the far end.
        chart: Vec<KeywordCount>,
    },
}

pub struct KeywordExtractor {
    params: KeywordParams,
    stopwords: Stopwords,
    source: Box<dyn CandidateSource>,
}

impl std::fmt::Debug for KeywordExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordExtractor")
            .field("params", &self.params)
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(KeywordParams::default(), Stopwords::builtin(), WindowScan::default())
    }
}

impl KeywordExtractor {
    pub fn new(params: KeywordParams, stopwords: Stopwords, source: impl CandidateSource + 'static) -> Self {
        Self {
            params,
            stopwords,
            source: Box::new(source),
        }
    }

    pub fn params(&self) -> KeywordParams {
        self.params
    }

    /// Ranked terms of one text blob, at most `top_n`.
    pub fn rank(&self, text: &str) -> Vec<KeywordCount> {
        let normalized = normalize(text);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        self.source.for_each_candidate(&normalized, &mut |c| {
            *counts.entry(c).or_default() += 1;
        });

        let mut kept: Vec<(&str, usize)> = counts
            .into_iter()
            .filter(|&(term, n)| n >= self.params.min_frequency && !self.stopwords.contains(term))
            .collect();
        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        kept.truncate(self.params.top_n);

        kept.into_iter()
            .map(|(term, count)| KeywordCount {
                term: term.to_string(),
                count,
            })
            .collect()
    }

    /// Keyword report for a view, optionally limited to one overall sentiment.
    pub fn analyze(&self, view: &FilteredView<'_>, subset: Option<Sentiment>) -> KeywordReport {
        let started = Instant::now();
        let sub = view.with_sentiment(subset);
        let combined = sub
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let report = if sub.iter().all(|r| r.text.is_empty()) {
            KeywordReport::NoText { reviews: sub.len() }
        } else {
            let top = self.rank(&combined);
            if top.is_empty() {
                KeywordReport::InsufficientVocabulary {
                    reviews: sub.len(),
                    min_frequency: self.params.min_frequency,
                }
            } else {
                let mut chart: Vec<KeywordCount> =
                    top.iter().take(self.params.chart_n).cloned().collect();
                chart.reverse();
                KeywordReport::Ranked {
                    reviews: sub.len(),
                    top,
                    chart,
                }
            }
        };

        let ms = started.elapsed().as_secs_f64() * 1000.0;
        histogram!("keyword_extract_ms").record(ms);
        debug!(reviews = sub.len(), chars = combined.len(), ms, "keywords extracted");
        report
    }
}
