//! Raw review browser: the filtered view in a caller-chosen order, capped.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::filter::FilteredView;
use crate::review::{Review, Sentiment, Star};

pub const DEFAULT_BROWSE_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOrder {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
}

impl ReviewOrder {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "highest" => Ok(Self::Highest),
            "lowest" => Ok(Self::Lowest),
            _ => Err(DashboardError::invalid_facet(
                "order",
                raw,
                "newest, oldest, highest, lowest",
            )),
        }
    }

    fn sort(self, rows: &mut [&Review]) {
        // slice::sort_by is stable: ties keep store order
        match self {
            Self::Newest => rows.sort_by(|a, b| b.date.cmp(&a.date)),
            Self::Oldest => rows.sort_by(|a, b| a.date.cmp(&b.date)),
            Self::Highest => rows.sort_by(|a, b| b.star.cmp(&a.star)),
            Self::Lowest => rows.sort_by(|a, b| a.star.cmp(&b.star)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowseRow {
    pub id: u64,
    pub date: NaiveDate,
    pub author: String,
    pub star: Star,
    pub sentiment: Sentiment,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowsePage {
    pub order: ReviewOrder,
    /// Size of the view before the row cap.
    pub matching: usize,
    pub rows: Vec<BrowseRow>,
}

pub fn browse(view: &FilteredView<'_>, order: ReviewOrder, rows: usize) -> BrowsePage {
    let mut sorted: Vec<&Review> = view.reviews().to_vec();
    order.sort(&mut sorted);
    BrowsePage {
        order,
        matching: sorted.len(),
        rows: sorted
            .into_iter()
            .take(rows)
            .map(|r| BrowseRow {
                id: r.id,
                date: r.date,
                author: r.author.clone(),
                star: r.star,
                sentiment: r.sentiment,
                text: r.text.clone(),
            })
            .collect(),
    }
}
