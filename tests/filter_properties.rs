//! Randomized property checks over generated stores (seeded, deterministic).
//! Filter soundness, share sums, drilldown partition and keyword invariants.

use chrono::{Duration, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};

use review_facets::aggregate::{mean_score_table, sentiment_share, TimeGrain};
use review_facets::drilldown::{self, DrilldownLimits, ScoreClass, SubFilter};
use review_facets::keywords::{KeywordExtractor, KeywordReport, Stopwords};
use review_facets::{Dimension, FilterSpec, FilteredView, Review, ReviewStore, Sentiment, Star};

const STARS: [f64; 9] = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];
const WORDS: [&str; 10] = [
    "早餐", "服務", "房間", "乾淨", "the", "staff", "交通", "方便", "noisy", "value",
];

fn random_store(rng: &mut StdRng, n: usize) -> ReviewStore {
    let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let reviews = (0..n as u64)
        .map(|id| {
            let mut scores: [Option<f64>; 7] = Default::default();
            for s in scores.iter_mut() {
                if rng.random_bool(0.4) {
                    // coarse grid so exact zeros show up too
                    *s = Some(rng.random_range(-4i32..=4) as f64 / 4.0);
                }
            }
            let words = rng.random_range(0..12);
            let text = (0..words)
                .map(|_| WORDS[rng.random_range(0..WORDS.len())])
                .collect::<Vec<_>>()
                .join(" ");
            Review {
                id,
                date: base + Duration::days(rng.random_range(0..540)),
                author: format!("guest-{id}"),
                star: Star::new(STARS[rng.random_range(0..STARS.len())]).unwrap(),
                sentiment: Sentiment::ALL[rng.random_range(0..3)],
                text,
                scores,
                reasons: Default::default(),
            }
        })
        .collect();
    ReviewStore::from_reviews("random", reviews)
}

fn random_spec(rng: &mut StdRng) -> FilterSpec {
    let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let a = base + Duration::days(rng.random_range(-30..570));
    let b = base + Duration::days(rng.random_range(-30..570));
    let stars = STARS
        .iter()
        .filter(|_| rng.random_bool(0.6))
        .filter_map(|&v| Star::new(v))
        .collect::<Vec<_>>();
    let sentiments = Sentiment::ALL
        .into_iter()
        .filter(|_| rng.random_bool(0.7))
        .collect::<Vec<_>>();
    FilterSpec::new(a.min(b), a.max(b), stars, sentiments)
}

#[test]
fn filtered_view_is_a_sound_subset() {
    let mut rng = StdRng::seed_from_u64(7);
    let store = random_store(&mut rng, 400);
    for _ in 0..200 {
        let spec = random_spec(&mut rng);
        let view = spec.apply(&store);
        assert!(view.len() <= store.len());
        assert_eq!(view.store_total(), store.len());
        for r in view.iter() {
            assert!(spec.start <= r.date && r.date <= spec.end);
            assert!(spec.stars.contains(&r.star));
            assert!(spec.sentiments.contains(&r.sentiment));
        }
        // nothing that matches was dropped
        let expected = store.reviews().iter().filter(|r| spec.matches(r)).count();
        assert_eq!(view.len(), expected);
    }
}

#[test]
fn sentiment_shares_sum_to_hundred() {
    let mut rng = StdRng::seed_from_u64(11);
    let store = random_store(&mut rng, 300);
    for _ in 0..50 {
        let view = random_spec(&mut rng).apply(&store);
        for grain in [TimeGrain::Month, TimeGrain::Year] {
            for b in sentiment_share(&view, grain) {
                assert!(b.total > 0);
                assert!((b.sum() - 100.0).abs() <= 0.1 + 1e-9, "{b:?}");
            }
        }
    }
}

#[test]
fn absent_dimension_mean_is_undefined() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut store_reviews = random_store(&mut rng, 50).reviews().to_vec();
    for r in store_reviews.iter_mut() {
        r.scores[Dimension::Value.index()] = None;
    }
    let store = ReviewStore::from_reviews("no-value", store_reviews);
    let table = mean_score_table(&FilteredView::all(&store));
    let value = table
        .iter()
        .find(|row| row.dimension == Dimension::Value)
        .unwrap();
    assert_eq!(value.mean, None);
    assert_eq!(value.present, 0);
}

#[test]
fn drilldown_classes_partition_the_scope() {
    let mut rng = StdRng::seed_from_u64(23);
    let store = random_store(&mut rng, 300);
    let view = FilteredView::all(&store);
    for d in Dimension::ALL {
        let scope = drilldown::scope(&view, d);
        let Some(report) = drilldown::run(&view, d, SubFilter::All, DrilldownLimits::default())
            .report()
            .cloned()
        else {
            assert!(scope.is_empty());
            continue;
        };
        assert_eq!(report.breakdown.total(), scope.len());

        let mut seen = 0;
        for sub in [SubFilter::Positive, SubFilter::Neutral, SubFilter::Negative] {
            let part = drilldown::run(&view, d, sub, DrilldownLimits::default());
            let part = part.report().unwrap();
            seen += part.matching;
            assert!(part.table.iter().all(|row| sub.admits(row.class)));
            assert!(part
                .table
                .iter()
                .all(|row| row.class == ScoreClass::of(row.score)));
        }
        assert_eq!(seen, scope.len());
    }
}

#[test]
fn keyword_output_respects_length_frequency_and_stopwords() {
    let mut rng = StdRng::seed_from_u64(5);
    let store = random_store(&mut rng, 200);
    let ex = KeywordExtractor::default();
    let stop = Stopwords::builtin();
    for _ in 0..20 {
        let view = random_spec(&mut rng).apply(&store);
        if let KeywordReport::Ranked { top, chart, .. } = ex.analyze(&view, None) {
            assert!(top.len() <= 30);
            assert!(chart.len() <= 20);
            for k in &top {
                let n = k.term.chars().count();
                assert!((2..=4).contains(&n), "{:?}", k.term);
                assert!(k.count >= 3);
                assert!(!stop.contains(&k.term));
            }
        }
    }
}
