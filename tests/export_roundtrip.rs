// tests/export_roundtrip.rs
//
// Export a filtered view, read the CSV back through the loader, and check
// that the same reviews come back.

use std::collections::BTreeSet;
use std::fs;

use review_facets::store::{export, load_csv, read_reviews, StoreCache};
use review_facets::{FilterSpec, FilteredView, ReviewStore, Sentiment};

const SNAPSHOT: &str = "\
date,name,star,sentiment,text,r_sentiment.Staff Service,r_sentiment.Location,r_sentiment.Room & Bathroom Quality,r_sentiment.Environment,r_sentiment.Facilities,r_sentiment.Food & Beverage,r_sentiment.Value,reasons.Staff Service,reasons.Location,reasons.Room & Bathroom Quality,reasons.Environment,reasons.Facilities,reasons.Food & Beverage,reasons.Value
2024-01-05,Amy,5,1,\"Friendly staff, great breakfast\",0.9,,,,,0.8,,friendly staff,,,,,great breakfast,
2024-01-20,陳先生,2,-1,房間隔音差，晚上很吵,,,-0.7,-0.8,,,,,,房間隔音差,晚上很吵,,,
2024-02-02,Dora,3.5,0,,,,,,,,0.5,,,,,,,價格合理
2024-02-14,Eli,4.5,1,\"Quiet, clean, \"\"perfect\"\" stay\",,0.0,0.6,,,,,,,clean,,,,
";

fn ids(view: &FilteredView<'_>) -> BTreeSet<u64> {
    view.iter().map(|r| r.id).collect()
}

#[test]
fn export_then_reload_keeps_review_identities() {
    let reviews = read_reviews(SNAPSHOT.as_bytes(), "inline").unwrap();
    let store = ReviewStore::from_reviews("inline", reviews);

    let mut spec = FilterSpec::everything(&store);
    spec.sentiments = [Sentiment::Positive, Sentiment::Negative].into_iter().collect();
    let view = spec.apply(&store);
    assert_eq!(view.len(), 3);

    let bytes = export::to_csv_bytes(&view).unwrap();
    let reloaded = read_reviews(bytes.as_slice(), "export").unwrap();
    let reloaded_ids: BTreeSet<u64> = reloaded.iter().map(|r| r.id).collect();
    assert_eq!(reloaded_ids, ids(&view));

    // ignoring derived columns, the records themselves survive too
    for r in &reloaded {
        let original = store.get(r.id).unwrap();
        assert_eq!(r, original);
    }
}

#[test]
fn export_of_empty_view_is_header_only() {
    let reviews = read_reviews(SNAPSHOT.as_bytes(), "inline").unwrap();
    let store = ReviewStore::from_reviews("inline", reviews);
    let mut spec = FilterSpec::everything(&store);
    spec.stars.clear();
    let view = spec.apply(&store);

    let bytes = export::to_csv_bytes(&view).unwrap();
    let text = String::from_utf8(bytes[export::UTF8_BOM.len()..].to_vec()).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("id,date,name,star,sentiment,text"));
    assert!(text.trim_end().ends_with("year,month,year_month"));
    assert!(read_reviews(bytes.as_slice(), "empty").unwrap().is_empty());
}

#[test]
fn file_snapshot_is_memoized_until_it_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviews.csv");
    fs::write(&path, SNAPSHOT).unwrap();

    let cache = StoreCache::new();
    let a = cache.get_or_load(&path).unwrap();
    let b = cache.get_or_load(&path).unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(a.len(), 4);

    // a rewritten snapshot (different size) is a different key
    let store = load_csv(&path).unwrap();
    let bytes = export::to_csv_bytes(&FilteredView::all(&store)).unwrap();
    fs::write(&path, bytes).unwrap();
    let c = cache.get_or_load(&path).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&a, &c));
    assert_eq!(c.len(), 4);
    assert_eq!(cache.len(), 1);
}
