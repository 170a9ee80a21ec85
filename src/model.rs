//! Precomputed latent-factor model state.
//!
//! Holds the NMF-style user/item factor matrices, the identifier indexes and
//! the user-item interaction matrix. Everything is validated once at
//! construction and immutable afterwards; `recommend` calls only read.

use ndarray::{Array1, Array2};
use std::collections::HashMap;

use crate::error::RecommenderError;

/// Sparse user-item interaction matrix.
///
/// Normalized at load into one sorted column-index list per user row. Only
/// used to exclude already-rated items from results; the values themselves
/// are irrelevant and are not stored.
#[derive(Debug, Clone, Default)]
pub struct InteractionMatrix {
    rows: Vec<Vec<usize>>,
    num_items: usize,
}

impl InteractionMatrix {
    /// Build from raw (user_row, item_col) entries.
    ///
    /// Entries outside the declared bounds fail fast rather than being
    /// silently dropped.
    pub fn from_entries(
        num_users: usize,
        num_items: usize,
        entries: &[(usize, usize)],
    ) -> Result<Self, RecommenderError> {
        let mut rows = vec![Vec::new(); num_users];
        for &(row, col) in entries {
            if row >= num_users || col >= num_items {
                return Err(RecommenderError::InvalidInteraction {
                    row,
                    col,
                    num_users,
                    num_items,
                });
            }
            rows[row].push(col);
        }
        for cols in &mut rows {
            cols.sort_unstable();
            cols.dedup();
        }
        Ok(Self { rows, num_items })
    }

    /// Column indices the given user row has interacted with, or `None`
    /// when the row is not present in the matrix.
    pub fn row(&self, user_row: usize) -> Option<&[usize]> {
        self.rows.get(user_row).map(Vec::as_slice)
    }

    pub fn num_users(&self) -> usize {
        self.rows.len()
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }
}

/// Immutable bundle of factor matrices and identifier indexes.
pub struct FactorModel {
    /// User latent factors: [num_users x latent_dim]
    user_factors: Array2<f32>,
    /// Item latent factors: [latent_dim x num_items]
    item_factors: Array2<f32>,
    /// Row index to external user id
    user_ids: Vec<u32>,
    /// External user id to row index; first occurrence wins on duplicates
    user_rows: HashMap<u32, usize>,
    /// Item row index to ISBN
    isbns: Vec<String>,
    interactions: InteractionMatrix,
}

impl FactorModel {
    /// Validate shapes and build the model bundle.
    ///
    /// All structural invariants are checked here, once. A mismatch is fatal:
    /// the service refuses to initialize rather than produce wrong scores.
    pub fn new(
        user_factors: Array2<f32>,
        item_factors: Array2<f32>,
        user_ids: Vec<u32>,
        isbns: Vec<String>,
        interactions: InteractionMatrix,
    ) -> Result<Self, RecommenderError> {
        let num_users = user_factors.nrows();
        let num_items = item_factors.ncols();

        if user_factors.ncols() != item_factors.nrows() {
            return Err(RecommenderError::DimensionMismatch {
                what: "latent dimension".to_string(),
                expected: user_factors.ncols(),
                actual: item_factors.nrows(),
            });
        }
        if user_ids.len() != num_users {
            return Err(RecommenderError::DimensionMismatch {
                what: "user index length".to_string(),
                expected: num_users,
                actual: user_ids.len(),
            });
        }
        if isbns.len() != num_items {
            return Err(RecommenderError::DimensionMismatch {
                what: "item index length".to_string(),
                expected: num_items,
                actual: isbns.len(),
            });
        }
        if interactions.num_users() != num_users {
            return Err(RecommenderError::DimensionMismatch {
                what: "interaction matrix rows".to_string(),
                expected: num_users,
                actual: interactions.num_users(),
            });
        }
        if interactions.num_items() != num_items {
            return Err(RecommenderError::DimensionMismatch {
                what: "interaction matrix columns".to_string(),
                expected: num_items,
                actual: interactions.num_items(),
            });
        }

        let mut user_rows = HashMap::with_capacity(user_ids.len());
        for (row, &id) in user_ids.iter().enumerate() {
            user_rows.entry(id).or_insert(row);
        }

        Ok(Self {
            user_factors,
            item_factors,
            user_ids,
            user_rows,
            isbns,
            interactions,
        })
    }

    /// Internal row index for an external user id, or `None` for unknown
    /// users (the cold-start case).
    pub fn user_row(&self, user_id: u32) -> Option<usize> {
        self.user_rows.get(&user_id).copied()
    }

    /// Predicted affinity of one user row against every item: the dot
    /// product of the user's latent vector with each item column.
    pub fn scores_for(&self, user_row: usize) -> Array1<f32> {
        self.user_factors.row(user_row).dot(&self.item_factors)
    }

    /// Item columns the given user row has already rated, or `None` when
    /// the interaction matrix has no such row.
    pub fn rated_items(&self, user_row: usize) -> Option<&[usize]> {
        self.interactions.row(user_row)
    }

    pub fn isbn(&self, item_row: usize) -> &str {
        &self.isbns[item_row]
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_items(&self) -> usize {
        self.isbns.len()
    }

    pub fn latent_dim(&self) -> usize {
        self.user_factors.ncols()
    }
}
