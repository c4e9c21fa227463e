use std::time::Duration;

use async_trait::async_trait;
use bookscout_core::{AppConfig, BookRecord, Enricher};
use serde_json::Value;

use crate::error::Result;
use crate::http::{RateLimitedClient, join_segments};
use crate::sources::string_list;

/// Enrichment adapter over the Open Library brief volumes API.
pub struct OpenLibrarySource {
    client: RateLimitedClient,
    base_url: String,
}

impl OpenLibrarySource {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = RateLimitedClient::from_config(&config.http)?;
        Ok(Self {
            client,
            base_url: config.enrichment.base_url.clone(),
        })
    }

    pub fn with_params(base_url: &str, min_interval: Duration) -> Result<Self> {
        Ok(Self {
            client: RateLimitedClient::new(min_interval, Duration::from_secs(30), "bookscout/0.1")?,
            base_url: base_url.to_string(),
        })
    }

    /// Subjects of the first record Open Library holds for `isbn13`.
    ///
    /// `Ok(None)` when Open Library has no record for the ISBN.
    pub async fn fetch_subjects(&self, isbn13: &str) -> Result<Option<Vec<String>>> {
        let file = format!("{isbn13}.json");
        let url = join_segments(&self.base_url, &["api", "volumes", "brief", "isbn", file.as_str()])?;
        let json: Value = self.client.get_json(&url).await?;
        Ok(subjects_from_brief(&json))
    }
}

fn subjects_from_brief(json: &Value) -> Option<Vec<String>> {
    let record = json
        .get("records")
        .and_then(Value::as_object)
        .and_then(|records| records.values().next())?;
    let details = record.get("details").and_then(|d| d.get("details"));
    Some(string_list(details.and_then(|d| d.get("subjects"))))
}

#[async_trait]
impl Enricher for OpenLibrarySource {
    async fn enrich(&self, mut book: BookRecord) -> BookRecord {
        let Some(isbn13) = book.identity().map(ToOwned::to_owned) else {
            return book;
        };

        match self.fetch_subjects(&isbn13).await {
            Ok(Some(subjects)) => {
                tracing::debug!(isbn13 = %isbn13, subjects = subjects.len(), "attached Open Library subjects");
                book.supplementary_subjects = subjects;
            }
            Ok(None) => tracing::debug!(isbn13 = %isbn13, "no Open Library record"),
            Err(e) => {
                tracing::warn!("Failed to fetch data from OpenLibrary for ISBN {isbn13}: {e}");
            }
        }
        book
    }
}
