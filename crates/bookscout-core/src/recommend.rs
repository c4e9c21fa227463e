use std::collections::HashMap;

use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::models::BookRecord;
use crate::source::CatalogSource;

pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 10;
pub const DEFAULT_PER_CATEGORY_LIMIT: usize = 50;

/// A recommended book together with the queried categories that returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub book: BookRecord,
    pub matched_categories: Vec<String>,
}

impl Recommendation {
    pub fn match_count(&self) -> usize {
        self.matched_categories.len()
    }
}

/// Per-book record of which category queries returned it, keyed by isbn13.
///
/// The first record seen for an isbn13 is kept; later hits only add their category.
#[derive(Debug, Default)]
pub struct MatchAccumulator {
    positions: HashMap<String, usize>,
    entries: Vec<Recommendation>,
}

impl MatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that `category` returned `book`. Books without an isbn13 cannot be
    /// deduplicated and are skipped; returns whether the book was counted.
    pub fn record(&mut self, category: &str, book: &BookRecord) -> bool {
        let Some(isbn13) = book.identity() else {
            return false;
        };

        let idx = match self.positions.get(isbn13) {
            Some(&idx) => idx,
            None => {
                self.positions.insert(isbn13.to_string(), self.entries.len());
                self.entries.push(Recommendation {
                    book: book.clone(),
                    matched_categories: Vec::new(),
                });
                self.entries.len() - 1
            }
        };

        let matched = &mut self.entries[idx].matched_categories;
        if !matched.iter().any(|c| c == category) {
            matched.push(category.to_string());
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by descending match count, ties in encounter order.
    pub fn into_ranked(mut self, max: usize) -> Vec<Recommendation> {
        self.entries
            .sort_by(|a, b| b.match_count().cmp(&a.match_count()));
        self.entries.truncate(max);
        self.entries
    }
}

/// Ranks catalog books by how many of the given categories they show up under.
#[derive(Debug, Clone)]
pub struct Recommender {
    max_recommendations: usize,
    per_category_limit: usize,
}

impl Default for Recommender {
    fn default() -> Self {
        Self {
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            per_category_limit: DEFAULT_PER_CATEGORY_LIMIT,
        }
    }
}

impl Recommender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_recommendations(mut self, max: usize) -> Self {
        self.max_recommendations = max;
        self
    }

    pub fn with_per_category_limit(mut self, limit: usize) -> Self {
        self.per_category_limit = limit;
        self
    }

    /// Query the catalog once per category, in the given order, and return at most
    /// `max_recommendations` books ranked by number of matching categories.
    ///
    /// Every category counts the same regardless of its tally weight.
    pub async fn recommend<S: AsRef<str> + Sync>(
        &self,
        categories: &[S],
        source: &dyn CatalogSource,
    ) -> Result<Vec<BookRecord>> {
        Ok(self
            .recommend_with_matches(categories, source)
            .await?
            .into_iter()
            .map(|rec| rec.book)
            .collect())
    }

    pub async fn recommend_with_matches<S: AsRef<str> + Sync>(
        &self,
        categories: &[S],
        source: &dyn CatalogSource,
    ) -> Result<Vec<Recommendation>> {
        if categories.is_empty() {
            return Err(CoreError::NoCategoriesToSearch);
        }

        let mut accumulator = MatchAccumulator::new();
        for category in categories {
            let category = category.as_ref();
            let books = source
                .fetch_by_category(category, self.per_category_limit)
                .await;

            let mut dropped = 0usize;
            for book in &books {
                if !accumulator.record(category, book) {
                    dropped += 1;
                }
            }
            tracing::debug!(
                category,
                fetched = books.len(),
                without_isbn = dropped,
                "category results accumulated"
            );
        }

        tracing::info!(
            categories = categories.len(),
            distinct_books = accumulator.len(),
            "recommendation pass complete"
        );
        Ok(accumulator.into_ranked(self.max_recommendations))
    }
}
