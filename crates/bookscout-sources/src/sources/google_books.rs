use std::time::Duration;

use async_trait::async_trait;
use bookscout_core::{AppConfig, BookRecord, CatalogSource};
use serde_json::Value;

use crate::error::Result;
use crate::http::{RateLimitedClient, join_segments};
use crate::sources::string_list;

/// The volumes endpoint refuses `maxResults` above 40.
const MAX_PAGE_SIZE: usize = 40;

/// One entry of a Google Books `volumes` listing, flattened from `volumeInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Volume {
    pub title: String,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub main_category: Option<String>,
    pub categories: Vec<String>,
    pub isbn13: Option<String>,
}

impl Volume {
    pub fn from_json(v: &Value) -> Self {
        let info = v.get("volumeInfo").unwrap_or(&Value::Null);
        let text = |key: &str| info.get(key).and_then(Value::as_str).map(ToOwned::to_owned);

        let isbn13 = info
            .get("industryIdentifiers")
            .and_then(Value::as_array)
            .and_then(|ids| {
                ids.iter()
                    .filter(|id| id.is_object())
                    .find(|id| id.get("type").and_then(Value::as_str) == Some("ISBN_13"))
            })
            .map(|id| {
                id.get("identifier")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            });

        Self {
            title: text("title").unwrap_or_default(),
            authors: string_list(info.get("authors")),
            publisher: text("publisher"),
            published_date: text("publishedDate"),
            main_category: text("mainCategory"),
            categories: string_list(info.get("categories")),
            isbn13,
        }
    }

    /// Case-insensitive substring match on both title and (any) author.
    pub fn matches(&self, title: &str, author: &str) -> bool {
        let search_title = title.trim().to_lowercase();
        let search_author = author.trim().to_lowercase();

        self.authors
            .iter()
            .any(|a| a.to_lowercase().contains(&search_author))
            && self.title.to_lowercase().contains(&search_title)
    }

    pub fn into_record(self) -> BookRecord {
        BookRecord {
            isbn13: self.isbn13,
            title: self.title,
            authors: self.authors,
            publisher: self.publisher,
            published_date: self.published_date,
            main_category: self.main_category,
            categories: self.categories,
            supplementary_subjects: Vec::new(),
        }
    }
}

/// Catalog adapter over the Google Books `volumes` search.
pub struct GoogleBooksSource {
    client: RateLimitedClient,
    base_url: String,
    api_key: Option<String>,
    page_size: usize,
}

impl GoogleBooksSource {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = RateLimitedClient::from_config(&config.http)?;
        Ok(Self {
            client,
            base_url: config.catalog.base_url.clone(),
            api_key: config.catalog.api_key.clone(),
            page_size: config.catalog.page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    pub fn with_params(base_url: &str, min_interval: Duration, page_size: usize) -> Result<Self> {
        let client = RateLimitedClient::new(min_interval, Duration::from_secs(30), "bookscout/0.1")?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: None,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    /// Raw volumes for a title/author query, keeping only those whose title and
    /// authors actually contain the search terms.
    pub async fn search_title_author(&self, title: &str, author: &str, max_to_fetch: usize) -> Vec<Volume> {
        let query = format!("intitle:\"{title}\"+inauthor:\"{author}\"");
        let volumes: Vec<Volume> = self
            .search_volumes(&query, max_to_fetch)
            .await
            .into_iter()
            .filter(|v| v.matches(title, author))
            .collect();

        if volumes.is_empty() {
            tracing::warn!("No books were found with the title '{title}' and author '{author}'");
        }
        volumes
    }

    pub async fn search_category(&self, category: &str, max_to_fetch: usize) -> Vec<Volume> {
        let query = format!("subject:\"{category}\"");
        let volumes = self.search_volumes(&query, max_to_fetch).await;
        if volumes.is_empty() {
            tracing::info!("No books found with the category: {category}");
        }
        volumes
    }

    /// Page through the volumes search until `max_to_fetch` is reached, a page
    /// comes back without items, or a request fails.
    pub async fn search_volumes(&self, query: &str, max_to_fetch: usize) -> Vec<Volume> {
        let mut volumes = Vec::new();

        for start in (0..max_to_fetch).step_by(self.page_size) {
            let count = self.page_size.min(max_to_fetch - start);
            match self.fetch_page(query, start, count).await {
                Ok(page) if page.is_empty() => break,
                Ok(page) => volumes.extend(page),
                Err(e) => {
                    tracing::warn!(query, start, "An error occurred: {e}");
                    break;
                }
            }
        }

        volumes.truncate(max_to_fetch);
        volumes
    }

    async fn fetch_page(&self, query: &str, start: usize, count: usize) -> Result<Vec<Volume>> {
        let mut url = join_segments(&self.base_url, &["volumes"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("maxResults", &count.to_string())
                .append_pair("startIndex", &start.to_string());
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }

        let json: Value = self.client.get_json(&url).await?;
        Ok(json
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Volume::from_json).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl CatalogSource for GoogleBooksSource {
    async fn fetch_by_title_author(
        &self,
        title: &str,
        author: &str,
        max_to_fetch: usize,
    ) -> Vec<BookRecord> {
        self.search_title_author(title, author, max_to_fetch)
            .await
            .into_iter()
            .map(Volume::into_record)
            .collect()
    }

    async fn fetch_by_category(&self, category: &str, max_to_fetch: usize) -> Vec<BookRecord> {
        self.search_category(category, max_to_fetch)
            .await
            .into_iter()
            .map(Volume::into_record)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;

    const BELL_TOLLS: &str = r#"{
        "items": [
            {
                "volumeInfo": {
                    "title": "For Whom the Bell Tolls",
                    "authors": ["Ernest Hemingway"],
                    "publishedDate": "1940-10-21",
                    "industryIdentifiers": [
                        {"type": "ISBN_10", "identifier": "238226294X"},
                        {"type": "ISBN_13", "identifier": "9782382262948"}
                    ],
                    "categories": ["Fiction"]
                }
            }
        ]
    }"#;

    fn source(base_url: &str, page_size: usize) -> GoogleBooksSource {
        GoogleBooksSource::with_params(base_url, Duration::from_millis(1), page_size).unwrap()
    }

    fn page(query: &str, start: usize, count: usize) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), query.into()),
            Matcher::UrlEncoded("startIndex".into(), start.to_string()),
            Matcher::UrlEncoded("maxResults".into(), count.to_string()),
        ])
    }

    #[test]
    fn parses_volume() {
        let v: Value = serde_json::from_str(BELL_TOLLS).unwrap();
        let volume = Volume::from_json(&v["items"][0]);
        assert_eq!(volume.title, "For Whom the Bell Tolls");
        assert_eq!(volume.isbn13.as_deref(), Some("9782382262948"));
        assert_eq!(volume.categories, vec!["Fiction"]);
        assert_eq!(volume.publisher, None);
        assert_eq!(volume.published_date.as_deref(), Some("1940-10-21"));
    }

    #[test]
    fn parses_volume_with_missing_fields() {
        let volume = Volume::from_json(&json!({
            "volumeInfo": {
                "industryIdentifiers": ["junk", {"type": "ISBN_10", "identifier": "0306406152"}]
            }
        }));
        assert_eq!(volume, Volume::default());
        assert_eq!(Volume::from_json(&json!({})), Volume::default());
    }

    #[test]
    fn matches_is_case_insensitive_substring() {
        let volume = Volume {
            title: "For Whom the Bell Tolls".to_string(),
            authors: vec!["Ernest Hemingway".to_string()],
            ..Default::default()
        };
        assert!(volume.matches("bell tolls", " hemingway "));
        assert!(!volume.matches("Old Man", "Hemingway"));
        assert!(!volume.matches("Bell Tolls", "Steinbeck"));
        assert!(!Volume::default().matches("", ""));
    }

    #[tokio::test]
    async fn title_author_search() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/volumes")
            .match_query(page(
                "intitle:\"For Whom the Bell Tolls\"+inauthor:\"Ernest Hemingway\"",
                0,
                1,
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BELL_TOLLS)
            .create_async()
            .await;

        let books = source(&server.url(), 40)
            .fetch_by_title_author("For Whom the Bell Tolls", "Ernest Hemingway", 1)
            .await;

        m.assert_async().await;
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "For Whom the Bell Tolls");
        assert_eq!(books[0].isbn13.as_deref(), Some("9782382262948"));
    }

    #[tokio::test]
    async fn title_author_search_filters_other_authors() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(BELL_TOLLS)
            .create_async()
            .await;

        let books = source(&server.url(), 40)
            .fetch_by_title_author("For Whom the Bell Tolls", "John Donne", 1)
            .await;
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn transport_error_returns_empty() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/volumes")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let books = source(&server.url(), 40)
            .fetch_by_title_author("For Whom the Bell Tolls", "Ernest Hemingway", 1)
            .await;
        m.assert_async().await;
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_returns_empty() {
        let books = source("http://127.0.0.1:9", 40)
            .fetch_by_category("Fiction", 1)
            .await;
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn category_search() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/volumes")
            .match_query(page("subject:\"Fiction\"", 0, 1))
            .with_status(200)
            .with_body(BELL_TOLLS)
            .create_async()
            .await;

        let books = source(&server.url(), 40).fetch_by_category("Fiction", 1).await;
        m.assert_async().await;
        assert_eq!(books[0].isbn13.as_deref(), Some("9782382262948"));
        assert_eq!(books[0].title, "For Whom the Bell Tolls");
    }

    #[tokio::test]
    async fn category_search_without_items() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"kind": "books#volumes", "totalItems": 0}"#)
            .create_async()
            .await;

        let books = source(&server.url(), 40).fetch_by_category("Fiction", 1).await;
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn paginates_until_empty_page() {
        let mut server = Server::new_async().await;
        let two = json!({"items": [
            {"volumeInfo": {"title": "A", "industryIdentifiers": [{"type": "ISBN_13", "identifier": "1"}]}},
            {"volumeInfo": {"title": "B", "industryIdentifiers": [{"type": "ISBN_13", "identifier": "2"}]}}
        ]});
        let first = server
            .mock("GET", "/volumes")
            .match_query(page("subject:\"Poetry\"", 0, 2))
            .with_status(200)
            .with_body(two.to_string())
            .create_async()
            .await;
        let second = server
            .mock("GET", "/volumes")
            .match_query(page("subject:\"Poetry\"", 2, 2))
            .with_status(200)
            .with_body(r#"{"totalItems": 2}"#)
            .create_async()
            .await;
        let third = server
            .mock("GET", "/volumes")
            .match_query(page("subject:\"Poetry\"", 4, 1))
            .expect(0)
            .create_async()
            .await;

        let books = source(&server.url(), 2).fetch_by_category("Poetry", 5).await;
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
        let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn failed_page_keeps_earlier_results() {
        let mut server = Server::new_async().await;
        let _first = server
            .mock("GET", "/volumes")
            .match_query(page("subject:\"Poetry\"", 0, 1))
            .with_status(200)
            .with_body(json!({"items": [{"volumeInfo": {"title": "A"}}]}).to_string())
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/volumes")
            .match_query(page("subject:\"Poetry\"", 1, 1))
            .with_status(500)
            .create_async()
            .await;

        let books = source(&server.url(), 1).fetch_by_category("Poetry", 3).await;
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "A");
        assert!(books[0].isbn13.is_none());
    }

    #[tokio::test]
    async fn config_api_key_is_sent() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/volumes")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "subject:\"Fiction\"".into()),
                Matcher::UrlEncoded("key".into(), "secret".into()),
            ]))
            .with_status(200)
            .with_body(BELL_TOLLS)
            .create_async()
            .await;

        let mut config = AppConfig::default();
        config.catalog.base_url = server.url();
        config.catalog.api_key = Some("secret".to_string());
        config.http.min_interval_ms = 1;

        let books = GoogleBooksSource::from_config(&config)
            .unwrap()
            .fetch_by_category("Fiction", 1)
            .await;
        m.assert_async().await;
        assert_eq!(books.len(), 1);
    }
}
