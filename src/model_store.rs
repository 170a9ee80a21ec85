//! Model artifact loading.
//!
//! The factor matrices, identifier indexes and interaction matrix are
//! bincode-serialized artifacts produced by the offline training pipeline;
//! the book catalog is a CSV export. All structural validation happens here,
//! once, so requests never re-probe shapes.
//!
//! Artifacts, relative to the model directory:
//! - `factors.bin`: user/item factor matrices as shape + flat data
//! - `interactions.bin`: sparse (user_row, item_col) rating entries
//! - `users.bin`: ordered external user ids (row order of `W`)
//! - `books.bin`: ordered ISBNs (column order of `H`)

use ndarray::Array2;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{BookCatalog, BookRecord};
use crate::config::ModelConfig;
use crate::error::RecommenderError;
use crate::model::{FactorModel, InteractionMatrix};

pub const FACTORS_FILE: &str = "factors.bin";
pub const INTERACTIONS_FILE: &str = "interactions.bin";
pub const USERS_FILE: &str = "users.bin";
pub const BOOKS_FILE: &str = "books.bin";

const ISBN_COLUMN: &str = "ISBN";
const TITLE_COLUMN: &str = "Book-Title";
const IMAGE_COLUMN: &str = "Image-URL-M";

/// Serializable representation of the dense factor matrices.
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializedFactors {
    pub w_shape: (usize, usize),
    pub w_data: Vec<f32>,
    pub h_shape: (usize, usize),
    pub h_data: Vec<f32>,
}

/// Serializable representation of the sparse interaction matrix.
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializedInteractions {
    pub num_users: usize,
    pub num_items: usize,
    pub entries: Vec<(u32, u32)>,
}

/// File-backed store for the recommendation model bundle.
pub struct ModelStore {
    model_dir: PathBuf,
    catalog_path: PathBuf,
}

impl ModelStore {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            model_dir: PathBuf::from(&config.model_dir),
            catalog_path: PathBuf::from(&config.catalog_path),
        }
    }

    /// Load and validate the whole bundle.
    ///
    /// Any structural inconsistency (unreadable artifact, shape mismatch,
    /// out-of-bounds interaction entry) is fatal here so the service refuses
    /// to start instead of serving wrong scores.
    pub fn load_bundle(
        &self,
        popular_count: usize,
    ) -> Result<(FactorModel, BookCatalog), RecommenderError> {
        let (user_factors, item_factors) = self.load_factors()?;
        let user_ids: Vec<u32> = read_artifact(&self.model_dir.join(USERS_FILE))?;
        let isbns: Vec<String> = read_artifact(&self.model_dir.join(BOOKS_FILE))?;
        let interactions = self.load_interactions()?;

        let model = FactorModel::new(user_factors, item_factors, user_ids, isbns, interactions)?;
        let catalog = load_catalog(&self.catalog_path, popular_count)?;

        tracing::info!(
            users = model.num_users(),
            items = model.num_items(),
            latent_dim = model.latent_dim(),
            catalog_books = catalog.len(),
            "Model bundle loaded"
        );

        Ok((model, catalog))
    }

    fn load_factors(&self) -> Result<(Array2<f32>, Array2<f32>), RecommenderError> {
        let path = self.model_dir.join(FACTORS_FILE);
        let raw: SerializedFactors = read_artifact(&path)?;

        let user_factors = Array2::from_shape_vec(raw.w_shape, raw.w_data)
            .map_err(|e| RecommenderError::model_load(&path, format!("user factors: {e}")))?;
        let item_factors = Array2::from_shape_vec(raw.h_shape, raw.h_data)
            .map_err(|e| RecommenderError::model_load(&path, format!("item factors: {e}")))?;

        Ok((user_factors, item_factors))
    }

    fn load_interactions(&self) -> Result<InteractionMatrix, RecommenderError> {
        let raw: SerializedInteractions =
            read_artifact(&self.model_dir.join(INTERACTIONS_FILE))?;
        let entries: Vec<(usize, usize)> = raw
            .entries
            .iter()
            .map(|&(row, col)| (row as usize, col as usize))
            .collect();
        InteractionMatrix::from_entries(raw.num_users, raw.num_items, &entries)
    }

    /// Write the factor matrices artifact. Used by fixture generation and
    /// tests; the production artifacts come from the training pipeline.
    pub fn save_factors(
        dir: &Path,
        user_factors: &Array2<f32>,
        item_factors: &Array2<f32>,
    ) -> Result<(), RecommenderError> {
        let raw = SerializedFactors {
            w_shape: user_factors.dim(),
            w_data: user_factors.iter().copied().collect(),
            h_shape: item_factors.dim(),
            h_data: item_factors.iter().copied().collect(),
        };
        write_artifact(&dir.join(FACTORS_FILE), &raw)
    }

    pub fn save_interactions(
        dir: &Path,
        num_users: usize,
        num_items: usize,
        entries: &[(u32, u32)],
    ) -> Result<(), RecommenderError> {
        let raw = SerializedInteractions {
            num_users,
            num_items,
            entries: entries.to_vec(),
        };
        write_artifact(&dir.join(INTERACTIONS_FILE), &raw)
    }

    pub fn save_user_ids(dir: &Path, user_ids: &[u32]) -> Result<(), RecommenderError> {
        write_artifact(&dir.join(USERS_FILE), &user_ids.to_vec())
    }

    pub fn save_isbns(dir: &Path, isbns: &[String]) -> Result<(), RecommenderError> {
        write_artifact(&dir.join(BOOKS_FILE), &isbns.to_vec())
    }
}

/// Load the book catalog CSV.
///
/// Requires `ISBN` and `Book-Title` columns; `Image-URL-M` is optional. The
/// first `popular_count` rows become the popularity fallback, in file order.
pub fn load_catalog(
    path: &Path,
    popular_count: usize,
) -> Result<BookCatalog, RecommenderError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| RecommenderError::model_load(path, format!("failed to open CSV: {e}")))?;

    let headers = reader
        .headers()
        .map_err(|e| RecommenderError::model_load(path, format!("failed to read headers: {e}")))?
        .clone();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let isbn_idx = column(ISBN_COLUMN).ok_or_else(|| {
        RecommenderError::model_load(
            path,
            format!(
                "missing required column '{}', available: {:?}",
                ISBN_COLUMN,
                headers.iter().collect::<Vec<_>>()
            ),
        )
    })?;
    let title_idx = column(TITLE_COLUMN).ok_or_else(|| {
        RecommenderError::model_load(path, format!("missing required column '{TITLE_COLUMN}'"))
    })?;
    let image_idx = column(IMAGE_COLUMN);

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            RecommenderError::model_load(path, format!("row {}: {e}", line + 2))
        })?;
        let image_url = image_idx
            .and_then(|idx| row.get(idx))
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        records.push(BookRecord {
            isbn: row.get(isbn_idx).unwrap_or_default().to_string(),
            title: row.get(title_idx).unwrap_or_default().to_string(),
            image_url,
        });
    }

    Ok(BookCatalog::new(records, popular_count))
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, RecommenderError> {
    let bytes = fs::read(path).map_err(|e| RecommenderError::model_load(path, e))?;
    bincode::deserialize(&bytes).map_err(|e| RecommenderError::model_load(path, e))
}

fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<(), RecommenderError> {
    let bytes = bincode::serialize(value).map_err(|e| RecommenderError::model_load(path, e))?;
    fs::write(path, bytes).map_err(|e| RecommenderError::model_load(path, e))
}
