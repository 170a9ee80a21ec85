//! Service configuration.
//!
//! Defaults can be overridden by an optional `config/bookrec.*` file and by
//! `BOOKREC`-prefixed environment variables.

use serde::{Deserialize, Serialize};

use crate::error::RecommenderError;

/// Book Recommendation Service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookRecConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Model artifact locations
    pub model: ModelConfig,

    /// Recommendation limits and defaults
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (default: 8084)
    pub port: u16,

    /// Worker threads
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Directory holding the factor/index/interaction artifacts
    pub model_dir: String,

    /// Path to the book catalog CSV
    pub catalog_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendationConfig {
    /// Results returned when the request does not say how many
    pub default_top_n: usize,

    /// Upper bound on requested results
    pub max_top_n: usize,

    /// Catalog rows kept as the popularity fallback
    pub popular_count: usize,
}

impl Default for BookRecConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8084,
                workers: None,
            },
            model: ModelConfig {
                model_dir: "./data/model".to_string(),
                catalog_path: "./data/books.csv".to_string(),
            },
            recommendation: RecommendationConfig {
                default_top_n: 5,
                max_top_n: 50,
                popular_count: 10,
            },
        }
    }
}

impl BookRecConfig {
    /// Load configuration from defaults, an optional config file and the
    /// environment.
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::with_name("config/bookrec").required(false))
            .add_source(config::Environment::with_prefix("BOOKREC").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate configuration values before the service starts serving.
    pub fn validate(&self) -> Result<(), RecommenderError> {
        if self.server.port == 0 {
            return Err(RecommenderError::ConfigurationError {
                message: "port must be greater than 0".to_string(),
                key: Some("BOOKREC__SERVER__PORT".to_string()),
            });
        }

        if self.recommendation.max_top_n == 0 {
            return Err(RecommenderError::ConfigurationError {
                message: "max_top_n must be greater than 0".to_string(),
                key: Some("BOOKREC__RECOMMENDATION__MAX_TOP_N".to_string()),
            });
        }

        if self.recommendation.default_top_n == 0
            || self.recommendation.default_top_n > self.recommendation.max_top_n
        {
            return Err(RecommenderError::ConfigurationError {
                message: format!(
                    "default_top_n ({}) must be within 1..={}",
                    self.recommendation.default_top_n, self.recommendation.max_top_n
                ),
                key: Some("BOOKREC__RECOMMENDATION__DEFAULT_TOP_N".to_string()),
            });
        }

        if self.model.model_dir.is_empty() {
            return Err(RecommenderError::ConfigurationError {
                message: "model_dir must not be empty".to_string(),
                key: Some("BOOKREC__MODEL__MODEL_DIR".to_string()),
            });
        }

        Ok(())
    }
}
