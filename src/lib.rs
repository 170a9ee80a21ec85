//! Book Recommendation Service
//!
//! Serves top-N book recommendations from a precomputed NMF-style latent
//! factor model. Known users are scored by the dot product of their latent
//! vector against every item; unknown users fall back to a popularity list.

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod model_store;
pub mod recommender;
pub mod server;
pub mod types;

// Re-export key types
pub use catalog::{BookCatalog, BookRecord, UNKNOWN_TITLE};
pub use config::{BookRecConfig, ModelConfig, RecommendationConfig, ServerConfig};
pub use error::RecommenderError;
pub use model::{FactorModel, InteractionMatrix};
pub use model_store::ModelStore;
pub use recommender::{Recommender, COLD_START_STATUS};
pub use types::{RecommendRequest, RecommendResponse, RecommendedBook, Recommendations};
