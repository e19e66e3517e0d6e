//! Error taxonomy for the review analytics engine.
//!
//! Empty result sets are NOT errors: every component returns an explicit
//! empty/undefined value for those. Only broken input data and facet values
//! outside the fixed enumerations end up here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// Source snapshot could not be opened or parsed at all.
    #[error("failed to load reviews from {path}: {message} ({hint})")]
    Load {
        path: String,
        message: String,
        hint: String,
    },

    #[error("review snapshot {path} is missing required columns: {}. Export the full sheet including every r_sentiment.* and reasons.* column", .missing.join(", "))]
    MissingColumns { path: String, missing: Vec<String> },

    /// `row` is 1-based and counts the header line, so it matches a spreadsheet view.
    #[error("invalid review record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    #[error("invalid {facet} value '{value}' (expected one of: {expected})")]
    InvalidFacet {
        facet: &'static str,
        value: String,
        expected: String,
    },

    #[error("export failed: {message}")]
    Export { message: String },
}

impl DashboardError {
    pub(crate) fn invalid_facet(
        facet: &'static str,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        DashboardError::InvalidFacet {
            facet,
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn is_invalid_facet(&self) -> bool {
        matches!(self, DashboardError::InvalidFacet { .. })
    }
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        DashboardError::Export {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = if self.is_invalid_facet() {
            metrics::counter!("facet_rejections_total").increment(1);
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        tracing::warn!(error = %self, status = status.as_u16(), "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
