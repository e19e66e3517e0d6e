//! # Review record
//! The immutable per-review data model and the fixed facet enumerations
//! (sentiment, star rating, the seven semantic dimensions).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DashboardError, Result};

/// Overall reviewer sentiment. Encoded in source data as -1 / 0 / +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// Exact decode of the numeric encoding; anything but -1, 0, 1 is rejected.
    pub fn from_value(v: f64) -> Option<Self> {
        if v == -1.0 {
            Some(Sentiment::Negative)
        } else if v == 0.0 {
            Some(Sentiment::Neutral)
        } else if v == 1.0 {
            Some(Sentiment::Positive)
        } else {
            None
        }
    }

    pub fn value(self) -> i8 {
        match self {
            Sentiment::Negative => -1,
            Sentiment::Neutral => 0,
            Sentiment::Positive => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }

    /// Accepts the names (`positive`) or the numeric codes (`1`, `-1.0`).
    pub fn parse(raw: &str) -> Result<Self> {
        let t = raw.trim();
        let by_name = match t.to_ascii_lowercase().as_str() {
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            "positive" => Some(Sentiment::Positive),
            _ => None,
        };
        by_name
            .or_else(|| t.parse::<f64>().ok().and_then(Sentiment::from_value))
            .ok_or_else(|| {
                DashboardError::invalid_facet("sentiment", t, "negative, neutral, positive, -1, 0, 1")
            })
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Star rating in half-star steps, stored as the doubled value so it can be
/// hashed, ordered and compared exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Star(u8);

impl Star {
    pub const MAX: f64 = 5.0;

    pub fn new(v: f64) -> Option<Self> {
        if !v.is_finite() || !(0.0..=Self::MAX).contains(&v) {
            return None;
        }
        let doubled = v * 2.0;
        if doubled.fract() != 0.0 {
            return None;
        }
        Some(Star(doubled as u8))
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let t = raw.trim();
        t.parse::<f64>()
            .ok()
            .and_then(Star::new)
            .ok_or_else(|| DashboardError::invalid_facet("star", t, "0 to 5 in steps of 0.5"))
    }
}

impl TryFrom<f64> for Star {
    type Error = String;

    fn try_from(v: f64) -> std::result::Result<Self, Self::Error> {
        Star::new(v).ok_or_else(|| format!("star {v} is not a half-step in 0..=5"))
    }
}

impl From<Star> for f64 {
    fn from(s: Star) -> f64 {
        s.value()
    }
}

impl fmt::Display for Star {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{:.1}", self.value())
        }
    }
}

/// The seven fixed semantic aspects of a stay, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "Staff Service")]
    StaffService,
    #[serde(rename = "Location")]
    Location,
    #[serde(rename = "Room & Bathroom Quality")]
    RoomBathroom,
    #[serde(rename = "Environment")]
    Environment,
    #[serde(rename = "Facilities")]
    Facilities,
    #[serde(rename = "Food & Beverage")]
    FoodBeverage,
    #[serde(rename = "Value")]
    Value,
}

pub const DIMENSION_COUNT: usize = 7;

impl Dimension {
    pub const ALL: [Dimension; DIMENSION_COUNT] = [
        Dimension::StaffService,
        Dimension::Location,
        Dimension::RoomBathroom,
        Dimension::Environment,
        Dimension::Facilities,
        Dimension::FoodBeverage,
        Dimension::Value,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::StaffService => "Staff Service",
            Dimension::Location => "Location",
            Dimension::RoomBathroom => "Room & Bathroom Quality",
            Dimension::Environment => "Environment",
            Dimension::Facilities => "Facilities",
            Dimension::FoodBeverage => "Food & Beverage",
            Dimension::Value => "Value",
        }
    }

    /// Short machine key, handy in query strings.
    pub fn slug(self) -> &'static str {
        match self {
            Dimension::StaffService => "staff_service",
            Dimension::Location => "location",
            Dimension::RoomBathroom => "room_bathroom",
            Dimension::Environment => "environment",
            Dimension::Facilities => "facilities",
            Dimension::FoodBeverage => "food_beverage",
            Dimension::Value => "value",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn score_column(self) -> String {
        format!("r_sentiment.{}", self.label())
    }

    pub fn reason_column(self) -> String {
        format!("reasons.{}", self.label())
    }

    /// Case- and punctuation-insensitive match against the label or the slug,
    /// so `Food & Beverage`, `food_beverage` and `FOOD-BEVERAGE` all resolve.
    pub fn parse(raw: &str) -> Result<Self> {
        let key = squash(raw);
        Dimension::ALL
            .into_iter()
            .find(|d| squash(d.label()) == key || squash(d.slug()) == key)
            .ok_or_else(|| {
                let expected = Dimension::ALL
                    .iter()
                    .map(|d| d.label())
                    .collect::<Vec<_>>()
                    .join(", ");
                DashboardError::invalid_facet("dimension", raw.trim(), expected)
            })
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One guest review. Owned exclusively by the `ReviewStore`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: u64,
    pub date: NaiveDate,
    pub author: String,
    pub star: Star,
    pub sentiment: Sentiment,
    pub text: String,
    /// Indexed by `Dimension::index()`. `None` = the review did not discuss it.
    pub scores: [Option<f64>; DIMENSION_COUNT],
    pub reasons: [Option<String>; DIMENSION_COUNT],
}

impl Review {
    pub fn score(&self, d: Dimension) -> Option<f64> {
        self.scores[d.index()]
    }

    pub fn reason(&self, d: Dimension) -> Option<&str> {
        self.reasons[d.index()].as_deref()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// `YYYY-MM`, the monthly bucket key.
    pub fn year_month(&self) -> String {
        format!("{:04}-{:02}", self.date.year(), self.date.month())
    }
}
