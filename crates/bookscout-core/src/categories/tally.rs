use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::normalize::normalize;
use crate::error::{CoreError, Result};
use crate::models::BookRecord;

/// Canonical categories with their occurrence counts, highest count first.
///
/// Ties keep the order in which categories were first seen. Every count is at least one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTally {
    entries: Vec<(String, usize)>,
}

impl CategoryTally {
    /// Count canonical tokens and order them by descending count.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();

        for token in tokens {
            let token = token.into();
            if token.is_empty() {
                continue;
            }
            match positions.get(&token) {
                Some(&idx) => entries[idx].1 += 1,
                None => {
                    positions.insert(token.clone(), entries.len());
                    entries.push((token, 1));
                }
            }
        }

        // `sort_by` is stable, so equal counts stay in discovery order.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn truncate(&mut self, top_n: usize) {
        self.entries.truncate(top_n);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Category names in priority order.
    pub fn categories(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Serialize for CategoryTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, count) in &self.entries {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

/// Build a global category frequency table over all the given books.
///
/// Raw labels from every book are pooled before normalization, so the result is
/// not broken down per book. `top_n` keeps only the highest-count entries.
pub fn tally(books: &[BookRecord], top_n: Option<usize>) -> Result<CategoryTally> {
    if books.is_empty() {
        return Err(CoreError::NoBooks);
    }

    let pool: Vec<String> = books.iter().flat_map(BookRecord::raw_categories).collect();
    let tokens = normalize(&pool)?;

    let mut counted = CategoryTally::from_tokens(tokens);
    if let Some(n) = top_n {
        counted.truncate(n);
    }
    tracing::debug!(
        books = books.len(),
        raw = pool.len(),
        categories = counted.len(),
        "category tally built"
    );
    Ok(counted)
}
