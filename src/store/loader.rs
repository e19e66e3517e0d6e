// src/store/loader.rs
//! Tabular snapshot reader (CSV). Validates the column set up front and every
//! record on the way in, so the store only ever holds valid reviews.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::ReviewStore;
use crate::error::{DashboardError, Result};
use crate::review::{Dimension, Review, Sentiment, Star, DIMENSION_COUNT};

pub const REQUIRED_BASE_COLUMNS: [&str; 5] = ["date", "name", "star", "sentiment", "text"];
pub const ID_COLUMN: &str = "id";

/// Every column a snapshot must carry, in export order.
pub fn required_columns() -> Vec<String> {
    let mut cols: Vec<String> = REQUIRED_BASE_COLUMNS.iter().map(|s| s.to_string()).collect();
    for d in Dimension::ALL {
        cols.push(d.score_column());
        cols.push(d.reason_column());
    }
    cols
}

/// Load a CSV snapshot from disk into a fresh store.
pub fn load_csv(path: &Path) -> Result<ReviewStore> {
    let label = path.display().to_string();
    let file = fs::File::open(path).map_err(|e| DashboardError::Load {
        path: label.clone(),
        message: e.to_string(),
        hint: "check REVIEWS_DATA_PATH or data_path in config/dashboard.toml".into(),
    })?;
    let reviews = read_reviews(file, &label)?;
    info!(path = %label, reviews = reviews.len(), "review snapshot loaded");
    Ok(ReviewStore::from_reviews(label, reviews))
}

/// Parse reviews from any reader. `label` only feeds error messages.
pub fn read_reviews<R: Read>(mut reader: R, label: &str) -> Result<Vec<Review>> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(|e| DashboardError::Load {
            path: label.to_string(),
            message: e.to_string(),
            hint: "the snapshot must be UTF-8 encoded CSV".into(),
        })?;
    // Spreadsheet exports often lead with a BOM.
    let body = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(body.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| DashboardError::Load {
            path: label.to_string(),
            message: e.to_string(),
            hint: "the first line must be a CSV header row".into(),
        })?
        .clone();
    let columns = ColumnMap::resolve(&headers, label)?;

    let mut out = Vec::new();
    let mut seen_ids = HashSet::new();
    for (ordinal, rec) in rdr.records().enumerate() {
        // header is row 1
        let row = ordinal + 2;
        let rec = rec.map_err(|e| DashboardError::InvalidRecord {
            row,
            message: e.to_string(),
        })?;
        let review = columns.parse_record(&rec, ordinal as u64, row)?;
        if !seen_ids.insert(review.id) {
            return Err(DashboardError::InvalidRecord {
                row,
                message: format!("duplicate id {}", review.id),
            });
        }
        out.push(review);
    }
    debug!(path = %label, rows = out.len(), "snapshot parsed");
    Ok(out)
}

/// Column positions resolved once from the header row.
struct ColumnMap {
    id: Option<usize>,
    date: usize,
    name: usize,
    star: usize,
    sentiment: usize,
    text: usize,
    scores: [usize; DIMENSION_COUNT],
    reasons: [usize; DIMENSION_COUNT],
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord, label: &str) -> Result<Self> {
        let index: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, h)| (h, i)).collect();

        let missing: Vec<String> = required_columns()
            .into_iter()
            .filter(|c| !index.contains_key(c.as_str()))
            .collect();
        if !missing.is_empty() {
            return Err(DashboardError::MissingColumns {
                path: label.to_string(),
                missing,
            });
        }

        let col = |name: &str| index[name];
        let mut scores = [0usize; DIMENSION_COUNT];
        let mut reasons = [0usize; DIMENSION_COUNT];
        for d in Dimension::ALL {
            scores[d.index()] = col(&d.score_column());
            reasons[d.index()] = col(&d.reason_column());
        }

        Ok(Self {
            id: index.get(ID_COLUMN).copied(),
            date: col("date"),
            name: col("name"),
            star: col("star"),
            sentiment: col("sentiment"),
            text: col("text"),
            scores,
            reasons,
        })
    }

    fn parse_record(&self, rec: &csv::StringRecord, ordinal: u64, row: usize) -> Result<Review> {
        let field = |i: usize| rec.get(i).unwrap_or("");
        let bad = |message: String| DashboardError::InvalidRecord { row, message };

        let id = match self.id {
            Some(i) => {
                let raw = field(i).trim();
                raw.parse::<u64>()
                    .map_err(|_| bad(format!("id '{raw}' is not a non-negative integer")))?
            }
            None => ordinal,
        };

        let raw_date = field(self.date);
        let date = parse_date(raw_date)
            .ok_or_else(|| bad(format!("date '{}' is not a calendar date", raw_date.trim())))?;

        let raw_star = field(self.star).trim();
        let star = raw_star
            .parse::<f64>()
            .ok()
            .and_then(Star::new)
            .ok_or_else(|| bad(format!("star '{raw_star}' is not a half-step rating in 0..=5")))?;

        let raw_sent = field(self.sentiment).trim();
        let sentiment = raw_sent
            .parse::<f64>()
            .ok()
            .and_then(Sentiment::from_value)
            .ok_or_else(|| bad(format!("sentiment '{raw_sent}' must be exactly -1, 0 or 1")))?;

        let mut scores = [None; DIMENSION_COUNT];
        let mut reasons: [Option<String>; DIMENSION_COUNT] = Default::default();
        for d in Dimension::ALL {
            scores[d.index()] = parse_score(field(self.scores[d.index()]))
                .map_err(|m| bad(format!("{}: {m}", d.score_column())))?;
            reasons[d.index()] = non_empty(field(self.reasons[d.index()]));
        }

        Ok(Review {
            id,
            date,
            author: field(self.name).trim().to_string(),
            star,
            sentiment,
            text: field(self.text).to_string(),
            scores,
            reasons,
        })
    }
}

/// Date cells come in whatever shape the spreadsheet wrote them; only the
/// calendar day matters.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d);
        }
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(t).ok().map(|dt| dt.date_naive())
}

/// Empty / NaN cells mean "dimension not discussed".
fn parse_score(raw: &str) -> std::result::Result<Option<f64>, String> {
    let t = raw.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("nan") || t.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    let v: f64 = t.parse().map_err(|_| format!("score '{t}' is not a number"))?;
    if !v.is_finite() || !(-1.0..=1.0).contains(&v) {
        return Err(format!("score {v} outside [-1, 1]"));
    }
    Ok(Some(v))
}

fn non_empty(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(t.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> String {
        required_columns().join(",")
    }

    /// One CSV line with the given base fields; dimension cells from `dims`
    /// as (score, reason) pairs in canonical order.
    fn line(base: &str, dims: &[(&str, &str)]) -> String {
        let mut cells = vec![base.to_string()];
        for i in 0..DIMENSION_COUNT {
            let (s, r) = dims.get(i).copied().unwrap_or(("", ""));
            cells.push(s.to_string());
            cells.push(r.to_string());
        }
        cells.join(",")
    }

    #[test]
    fn parses_full_record_with_absent_dimensions() {
        let csv = format!(
            "\u{feff}{}\n{}\n",
            header(),
            line(
                "2024-05-01,Alice,4.5,1,Lovely stay",
                &[("0.8", "staff were kind"), ("", ""), ("0", "")]
            )
        );
        let rows = read_reviews(csv.as_bytes(), "mem").unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.id, 0);
        assert_eq!(r.author, "Alice");
        assert_eq!(r.star.value(), 4.5);
        assert_eq!(r.sentiment, Sentiment::Positive);
        assert_eq!(r.score(Dimension::StaffService), Some(0.8));
        assert_eq!(r.reason(Dimension::StaffService), Some("staff were kind"));
        assert_eq!(r.score(Dimension::Location), None);
        // zero is a real score, not absence
        assert_eq!(r.score(Dimension::RoomBathroom), Some(0.0));
        assert_eq!(r.reason(Dimension::RoomBathroom), None);
    }

    #[test]
    fn missing_columns_are_fatal_and_listed() {
        let csv = "date,name,star,sentiment\n2024-01-01,Bob,5,1\n";
        let err = read_reviews(csv.as_bytes(), "mem").unwrap_err();
        match err {
            DashboardError::MissingColumns { missing, .. } => {
                assert!(missing.contains(&"text".to_string()));
                assert!(missing.contains(&"reasons.Value".to_string()));
                assert_eq!(missing.len(), 1 + 14);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sentiment_outside_enumeration_is_invalid_record() {
        let csv = format!("{}\n{}\n", header(), line("2024-01-01,Bob,5,0.5,ok", &[]));
        let err = read_reviews(csv.as_bytes(), "mem").unwrap_err();
        assert!(
            matches!(err, DashboardError::InvalidRecord { row: 2, .. }),
            "got {err}"
        );
    }

    #[test]
    fn unparseable_date_fails_the_whole_load() {
        let csv = format!(
            "{}\n{}\n{}\n",
            header(),
            line("2024-01-01,Amy,5,1,fine", &[]),
            line("sometime in May,Bob,4,1,ok", &[]),
        );
        let err = read_reviews(csv.as_bytes(), "mem").unwrap_err();
        match err {
            DashboardError::InvalidRecord { row, .. } => assert_eq!(row, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn score_out_of_range_is_rejected() {
        let csv = format!(
            "{}\n{}\n",
            header(),
            line("2024-01-01,Bob,5,1,ok", &[("1.5", "")])
        );
        let err = read_reviews(csv.as_bytes(), "mem").unwrap_err();
        assert!(err.to_string().contains("r_sentiment.Staff Service"));
    }

    #[test]
    fn explicit_id_column_is_honoured() {
        let csv = format!(
            "id,{}\n42,{}\n7,{}\n",
            header(),
            line("2024-01-01,Bob,5,1,ok", &[]),
            line("2024-01-02,Eve,3,-1,bad", &[])
        );
        let rows = read_reviews(csv.as_bytes(), "mem").unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![42, 7]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let csv = format!(
            "id,{}\n1,{}\n1,{}\n",
            header(),
            line("2024-01-01,Bob,5,1,ok", &[]),
            line("2024-01-02,Eve,3,-1,bad", &[])
        );
        let err = read_reviews(csv.as_bytes(), "mem").unwrap_err();
        assert!(err.to_string().contains("duplicate id 1"));
    }

    #[test]
    fn date_shapes() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(parse_date("2024-02-29"), Some(d));
        assert_eq!(parse_date("2024/02/29"), Some(d));
        assert_eq!(parse_date("2024-02-29 13:45:00"), Some(d));
        assert_eq!(parse_date("2024-02-29T08:00:00+08:00"), Some(d));
        assert_eq!(parse_date("2023-02-29"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn unreadable_path_is_load_failure_with_hint() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        match err {
            DashboardError::Load { hint, .. } => assert!(hint.contains("REVIEWS_DATA_PATH")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
