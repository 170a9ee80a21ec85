//! Recommendation resolution.
//!
//! Maps a user id to its latent vector, scores every item by dot product,
//! excludes already-rated items and selects the top-N deterministically.
//! Unknown users fall back to the popularity list; no per-request condition
//! is an error.

use std::cmp::Ordering;

use crate::catalog::BookCatalog;
use crate::model::FactorModel;
use crate::types::{RecommendedBook, Recommendations};

/// Status message returned with the cold-start fallback.
pub const COLD_START_STATUS: &str = "User not found. Showing popular books.";

const SCORE_DECIMALS: f32 = 1000.0;

/// Top-N recommender over an immutable factor model and catalog.
///
/// All state is read-only after construction, so one instance can be shared
/// across threads without locking.
pub struct Recommender {
    model: FactorModel,
    catalog: BookCatalog,
}

impl Recommender {
    pub fn new(model: FactorModel, catalog: BookCatalog) -> Self {
        Self { model, catalog }
    }

    /// Resolve top-`top_n` recommendations for `user_id`.
    ///
    /// Known users get items ranked by predicted affinity, already-rated
    /// items excluded. Unknown users get the first `top_n` popularity
    /// fallback entries plus an informational status. A `top_n` of zero is
    /// clamped to one; requesting more items than exist returns them all.
    pub fn recommend(&self, user_id: u32, top_n: usize) -> Recommendations {
        let top_n = top_n.max(1);

        let user_row = match self.model.user_row(user_id) {
            Some(row) => row,
            None => return self.popular_fallback(user_id, top_n),
        };

        let mut scores = self.model.scores_for(user_row);

        // Masking is best-effort: a missing interaction row skips the step,
        // it never fails the request.
        if let Some(rated) = self.model.rated_items(user_row) {
            for &item in rated {
                scores[item] = f32::NEG_INFINITY;
            }
        }

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });

        // Masked items sort to the tail; never emit them even when top_n
        // exceeds the unmasked count.
        let books = order
            .into_iter()
            .filter(|&item| scores[item] != f32::NEG_INFINITY)
            .take(top_n)
            .map(|item| {
                let isbn = self.model.isbn(item);
                RecommendedBook {
                    isbn: isbn.to_string(),
                    title: self.catalog.title(isbn).to_string(),
                    image_url: self.catalog.image(isbn).map(str::to_string),
                    score: Some(round_score(scores[item])),
                }
            })
            .collect();

        Recommendations {
            books,
            status: None,
        }
    }

    fn popular_fallback(&self, user_id: u32, top_n: usize) -> Recommendations {
        tracing::debug!(user_id, "user not in factor model, serving popular books");

        let books = self
            .catalog
            .popular(top_n)
            .iter()
            .map(|record| RecommendedBook {
                isbn: record.isbn.clone(),
                title: record.title.clone(),
                image_url: record.image_url.clone(),
                score: None,
            })
            .collect();

        Recommendations {
            books,
            status: Some(COLD_START_STATUS.to_string()),
        }
    }

    pub fn model(&self) -> &FactorModel {
        &self.model
    }

    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }
}

fn round_score(score: f32) -> f32 {
    (score * SCORE_DECIMALS).round() / SCORE_DECIMALS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BookRecord, UNKNOWN_TITLE};
    use crate::model::InteractionMatrix;
    use ndarray::{array, Array2};

    fn catalog() -> BookCatalog {
        BookCatalog::new(
            vec![
                BookRecord {
                    isbn: "isbn-0".to_string(),
                    title: "Book Zero".to_string(),
                    image_url: Some("http://img/0.jpg".to_string()),
                },
                BookRecord {
                    isbn: "isbn-1".to_string(),
                    title: "Book One".to_string(),
                    image_url: None,
                },
                BookRecord {
                    isbn: "isbn-2".to_string(),
                    title: "Book Two".to_string(),
                    image_url: None,
                },
            ],
            10,
        )
    }

    fn recommender(w: Array2<f32>, h: Array2<f32>, rated: &[(usize, usize)]) -> Recommender {
        let num_users = w.nrows();
        let num_items = h.ncols();
        let interactions =
            InteractionMatrix::from_entries(num_users, num_items, rated).unwrap();
        let user_ids = (1..=num_users as u32).collect();
        let isbns = (0..num_items).map(|i| format!("isbn-{i}")).collect();
        let model = FactorModel::new(w, h, user_ids, isbns, interactions).unwrap();
        Recommender::new(model, catalog())
    }

    #[test]
    fn test_known_user_ranked_by_score() {
        // user 1 has vector [1, 0]; scores = [2, 0, 1]
        let rec = recommender(
            array![[1.0_f32, 0.0]],
            array![[2.0_f32, 0.0, 1.0], [0.0, 3.0, 0.0]],
            &[],
        );

        let result = rec.recommend(1, 2);
        assert!(result.status.is_none());
        assert_eq!(result.books.len(), 2);
        assert_eq!(result.books[0].isbn, "isbn-0");
        assert_eq!(result.books[0].score, Some(2.0));
        assert_eq!(result.books[0].title, "Book Zero");
        assert_eq!(result.books[1].isbn, "isbn-2");
        assert_eq!(result.books[1].score, Some(1.0));
    }

    #[test]
    fn test_rated_items_are_excluded() {
        // Same scores as above, but item 0 is already rated.
        let rec = recommender(
            array![[1.0_f32, 0.0]],
            array![[2.0_f32, 0.0, 1.0], [0.0, 3.0, 0.0]],
            &[(0, 0)],
        );

        let result = rec.recommend(1, 2);
        let isbns: Vec<_> = result.books.iter().map(|b| b.isbn.as_str()).collect();
        assert_eq!(isbns, vec!["isbn-2", "isbn-1"]);
    }

    #[test]
    fn test_rated_items_never_pad_the_tail() {
        // Only one unmasked item remains; asking for three must not
        // resurface the rated ones.
        let rec = recommender(
            array![[1.0_f32, 0.0]],
            array![[2.0_f32, 0.0, 1.0], [0.0, 3.0, 0.0]],
            &[(0, 0), (0, 1)],
        );

        let result = rec.recommend(1, 3);
        let isbns: Vec<_> = result.books.iter().map(|b| b.isbn.as_str()).collect();
        assert_eq!(isbns, vec!["isbn-2"]);
    }

    #[test]
    fn test_ties_break_by_item_row_order() {
        // All items score the same for user 1.
        let rec = recommender(
            array![[1.0_f32], [2.0]],
            array![[1.0_f32, 1.0, 1.0]],
            &[],
        );

        let result = rec.recommend(1, 3);
        let isbns: Vec<_> = result.books.iter().map(|b| b.isbn.as_str()).collect();
        assert_eq!(isbns, vec!["isbn-0", "isbn-1", "isbn-2"]);
    }

    #[test]
    fn test_scores_non_increasing_and_rounded() {
        let rec = recommender(
            array![[0.5_f32, 0.5]],
            array![[1.0_f32, 0.2222, 3.0], [0.0, 0.2222, 0.5]],
            &[],
        );

        let result = rec.recommend(1, 3);
        let scores: Vec<f32> = result.books.iter().map(|b| b.score.unwrap()).collect();
        for pair in scores.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        // 0.5 * 0.2222 + 0.5 * 0.2222 = 0.2222, rounded to 3 decimals
        assert_eq!(scores[2], 0.222);
    }

    #[test]
    fn test_top_n_larger_than_catalog_returns_all() {
        let rec = recommender(
            array![[1.0_f32, 0.0]],
            array![[2.0_f32, 0.0, 1.0], [0.0, 3.0, 0.0]],
            &[],
        );

        let result = rec.recommend(1, 50);
        assert_eq!(result.books.len(), 3);
    }

    #[test]
    fn test_zero_top_n_clamps_to_one() {
        let rec = recommender(
            array![[1.0_f32, 0.0]],
            array![[2.0_f32, 0.0, 1.0], [0.0, 3.0, 0.0]],
            &[],
        );

        let result = rec.recommend(1, 0);
        assert_eq!(result.books.len(), 1);
        assert_eq!(result.books[0].isbn, "isbn-0");
    }

    #[test]
    fn test_unknown_user_gets_popular_fallback() {
        let rec = recommender(
            array![[1.0_f32, 0.0]],
            array![[2.0_f32, 0.0, 1.0], [0.0, 3.0, 0.0]],
            &[],
        );

        let result = rec.recommend(999, 2);
        assert_eq!(result.status.as_deref(), Some(COLD_START_STATUS));
        assert_eq!(result.books.len(), 2);
        assert_eq!(result.books[0].isbn, "isbn-0");
        assert_eq!(result.books[0].title, "Book Zero");
        assert_eq!(result.books[0].score, None);
        assert_eq!(result.books[1].isbn, "isbn-1");
    }

    #[test]
    fn test_unknown_user_with_empty_catalog() {
        let model = FactorModel::new(
            array![[1.0_f32]],
            array![[1.0_f32]],
            vec![1],
            vec!["isbn-0".to_string()],
            InteractionMatrix::from_entries(1, 1, &[]).unwrap(),
        )
        .unwrap();
        let rec = Recommender::new(model, BookCatalog::new(Vec::new(), 10));

        let result = rec.recommend(999, 5);
        assert!(result.books.is_empty());
        assert_eq!(result.status.as_deref(), Some(COLD_START_STATUS));
    }

    #[test]
    fn test_metadata_miss_uses_placeholder_title() {
        // Model knows four items but the catalog only describes three.
        let rec = recommender(
            array![[1.0_f32]],
            array![[1.0_f32, 2.0, 3.0, 4.0]],
            &[],
        );

        let result = rec.recommend(1, 1);
        assert_eq!(result.books[0].isbn, "isbn-3");
        assert_eq!(result.books[0].title, UNKNOWN_TITLE);
        assert_eq!(result.books[0].image_url, None);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let rec = recommender(
            array![[0.3_f32, 0.7], [0.9, 0.1]],
            array![[2.0_f32, 0.0, 1.0], [0.0, 3.0, 0.0]],
            &[(0, 1)],
        );

        let first = rec.recommend(1, 3);
        let second = rec.recommend(1, 3);
        assert_eq!(first, second);
    }
}
