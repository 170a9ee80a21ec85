//! Book catalog metadata and popularity fallback.

use std::collections::HashMap;

/// Placeholder title for ISBNs missing from the catalog.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// One catalog row: ISBN plus display attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub isbn: String,
    pub title: String,
    pub image_url: Option<String>,
}

/// ISBN-keyed display metadata plus the popularity fallback list.
///
/// The fallback is the first `popular_count` records in the order the
/// catalog was provided; it is stable and never re-ranked.
pub struct BookCatalog {
    titles: HashMap<String, String>,
    images: HashMap<String, String>,
    popular: Vec<BookRecord>,
}

impl BookCatalog {
    pub fn new(records: Vec<BookRecord>, popular_count: usize) -> Self {
        let mut titles = HashMap::with_capacity(records.len());
        let mut images = HashMap::new();
        for record in &records {
            titles.insert(record.isbn.clone(), record.title.clone());
            if let Some(url) = &record.image_url {
                images.insert(record.isbn.clone(), url.clone());
            }
        }
        let mut popular = records;
        popular.truncate(popular_count);
        Self {
            titles,
            images,
            popular,
        }
    }

    /// Title for an ISBN; missing entries resolve to [`UNKNOWN_TITLE`].
    pub fn title(&self, isbn: &str) -> &str {
        self.titles.get(isbn).map_or(UNKNOWN_TITLE, String::as_str)
    }

    /// Image URL for an ISBN, if the catalog has one.
    pub fn image(&self, isbn: &str) -> Option<&str> {
        self.images.get(isbn).map(String::as_str)
    }

    /// First `n` popularity-fallback records (fewer when the catalog holds
    /// fewer, empty when no metadata was loaded).
    pub fn popular(&self, n: usize) -> &[BookRecord] {
        &self.popular[..n.min(self.popular.len())]
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
