//! Error types for the recommendation service.

use thiserror::Error;

/// Errors surfaced by the recommendation library.
///
/// Only load-time conditions are represented here. Per-request conditions
/// (unknown user, mask lookup failure, missing catalog metadata) degrade to
/// defined fallback values inside the recommender and never reach the caller
/// as errors.
#[derive(Debug, Error)]
pub enum RecommenderError {
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        key: Option<String>,
    },

    #[error("Failed to load model artifact {path}: {message}")]
    ModelLoad { path: String, message: String },

    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Interaction entry ({row}, {col}) outside matrix bounds {num_users}x{num_items}")]
    InvalidInteraction {
        row: usize,
        col: usize,
        num_users: usize,
        num_items: usize,
    },
}

impl RecommenderError {
    pub(crate) fn model_load(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Self::ModelLoad {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }
}
