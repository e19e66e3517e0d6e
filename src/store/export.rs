//! CSV export of a filtered view: UTF-8 with a byte-order mark so common
//! spreadsheet tools pick the encoding up, one row per review, every source
//! column plus the derived time-bucket columns.

use chrono::NaiveDate;
use std::io::Write;

use super::loader::{required_columns, ID_COLUMN};
use crate::error::{DashboardError, Result};
use crate::filter::FilteredView;
use crate::review::{Dimension, Review};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const DERIVED_COLUMNS: [&str; 3] = ["year", "month", "year_month"];

pub fn export_columns() -> Vec<String> {
    let mut cols = vec![ID_COLUMN.to_string()];
    cols.extend(required_columns());
    cols.extend(DERIVED_COLUMNS.iter().map(|s| s.to_string()));
    cols
}

/// `reviews_filtered_YYYYMMDD.csv`
pub fn export_file_name(today: NaiveDate) -> String {
    format!("reviews_filtered_{}.csv", today.format("%Y%m%d"))
}

pub fn write_csv<W: Write>(view: &FilteredView<'_>, mut out: W) -> Result<()> {
    out.write_all(UTF8_BOM).map_err(|e| DashboardError::Export {
        message: e.to_string(),
    })?;
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(export_columns())?;
    for r in view.iter() {
        wtr.write_record(record(r))?;
    }
    wtr.flush().map_err(|e| DashboardError::Export {
        message: e.to_string(),
    })?;
    Ok(())
}

pub fn to_csv_bytes(view: &FilteredView<'_>) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(256 * (view.len() + 1));
    write_csv(view, &mut buf)?;
    Ok(buf)
}

fn record(r: &Review) -> Vec<String> {
    let mut cells = vec![
        r.id.to_string(),
        r.date.format("%Y-%m-%d").to_string(),
        r.author.clone(),
        r.star.to_string(),
        r.sentiment.value().to_string(),
        r.text.clone(),
    ];
    for d in Dimension::ALL {
        // `{}` on f64 is the shortest repr that parses back exactly.
        cells.push(r.score(d).map(|s| s.to_string()).unwrap_or_default());
        cells.push(r.reason(d).unwrap_or_default().to_string());
    }
    cells.push(r.year().to_string());
    cells.push(r.month().to_string());
    cells.push(r.year_month());
    cells
}
