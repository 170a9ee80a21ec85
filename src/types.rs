//! Shared request/response types for the recommendation service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recommended book, ready for presentation.
///
/// `score` is present only on the personalized path; popularity fallback
/// entries carry no score. `image_url` is absent when the catalog has no
/// image for the ISBN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedBook {
    pub isbn: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Result of a single `recommend` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub books: Vec<RecommendedBook>,
    /// Informational message, e.g. the cold-start fallback notice. `None`
    /// on the personalized path.
    pub status: Option<String>,
}

/// Request body for `POST /recommendations`.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub user_id: u32,
    /// Number of results to return. Defaults to the configured value when
    /// omitted; must be within `1..=max_top_n`.
    pub top_n: Option<usize>,
}

/// Response body for `POST /recommendations`.
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub results: Vec<RecommendedBook>,
    pub status: Option<String>,
    pub generated_at: DateTime<Utc>,
}
