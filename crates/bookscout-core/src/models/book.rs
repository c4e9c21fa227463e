use serde::{Deserialize, Serialize};

/// A book as the core sees it, after a source adapter has flattened the raw payload.
///
/// Every field defaults, so records persisted by older runs (or trimmed by hand)
/// still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(default)]
    pub isbn13: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub publisher: Option<String>,

    #[serde(default)]
    pub published_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supplementary_subjects: Vec<String>,
}

impl BookRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_isbn13(mut self, isbn13: impl Into<String>) -> Self {
        self.isbn13 = Some(isbn13.into());
        self
    }

    /// The isbn13, treating an empty identifier as missing.
    pub fn identity(&self) -> Option<&str> {
        self.isbn13.as_deref().filter(|isbn| !isbn.is_empty())
    }

    /// Every uncurated category label attached to this record, in tally order:
    /// the category list, then the main category (empty when absent), then the
    /// supplementary subjects.
    pub fn raw_categories(&self) -> Vec<String> {
        let mut raw = Vec::with_capacity(self.categories.len() + self.supplementary_subjects.len() + 1);
        raw.extend(self.categories.iter().cloned());
        raw.push(self.main_category.clone().unwrap_or_default());
        raw.extend(self.supplementary_subjects.iter().cloned());
        raw
    }

    pub fn authors_display(&self) -> String {
        self.authors.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_categories_order() {
        let book = BookRecord {
            main_category: Some("Fiction".to_string()),
            categories: vec!["War".to_string(), "Spain".to_string()],
            supplementary_subjects: vec!["Classics".to_string()],
            ..BookRecord::new("For Whom the Bell Tolls")
        };
        assert_eq!(book.raw_categories(), vec!["War", "Spain", "Fiction", "Classics"]);
    }

    #[test]
    fn raw_categories_does_not_touch_record() {
        let book = BookRecord {
            categories: vec!["Fiction".to_string()],
            ..Default::default()
        };
        let first = book.raw_categories();
        let second = book.raw_categories();
        assert_eq!(first, second);
        assert_eq!(book.categories, vec!["Fiction"]);
    }

    #[test]
    fn missing_fields_default() {
        let book: BookRecord = serde_json::from_str(r#"{"title": "A book"}"#).unwrap();
        assert_eq!(book.title, "A book");
        assert!(book.isbn13.is_none());
        assert!(book.authors.is_empty());
        assert!(book.publisher.is_none());
    }

    #[test]
    fn empty_isbn_has_no_identity() {
        let book = BookRecord::new("x").with_isbn13("");
        assert_eq!(book.identity(), None);
        let book = BookRecord::new("x").with_isbn13("9780684803357");
        assert_eq!(book.identity(), Some("9780684803357"));
    }
}
