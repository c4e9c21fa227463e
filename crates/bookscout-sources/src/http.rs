use std::sync::Arc;
use std::time::{Duration, Instant};

use bookscout_core::config::HttpConfig;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{Result, SourceError};

// ─── RateLimitedClient ────────────────────────────────────────────────────────

/// HTTP client that spaces requests at least `min_interval` apart.
///
/// Each request is attempted once; callers decide what a failure means.
pub struct RateLimitedClient {
    client: reqwest::Client,
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimitedClient {
    pub fn new(min_interval: Duration, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Self::new(
            Duration::from_millis(config.min_interval_ms),
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )
    }

    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(t) = *last {
            let elapsed = t.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub async fn get(&self, url: &Url) -> Result<String> {
        self.wait_for_rate_limit().await;
        tracing::debug!(%url, "GET");

        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::ApiError(
                url.to_string(),
                format!("HTTP {}: {body}", status.as_u16()),
            ));
        }
        Ok(resp.text().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let text = self.get(url).await?;
        serde_json::from_str(&text).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|e| SourceError::InvalidUrl(base_url.to_string(), e.to_string()))
}

/// Append path segments to a base URL, keeping any path the base already has.
pub(crate) fn join_segments(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = parse_base_url(base_url)?;
    {
        let mut segs = url.path_segments_mut().map_err(|_| {
            SourceError::InvalidUrl(base_url.to_string(), "cannot be a base".to_string())
        })?;
        segs.pop_if_empty();
        segs.extend(segments);
    }
    Ok(url)
}
