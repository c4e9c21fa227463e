use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::recommend::{DEFAULT_MAX_RECOMMENDATIONS, DEFAULT_PER_CATEGORY_LIMIT};

/// Root application configuration, loaded from `~/.config/bookscout/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub enrichment: EnrichmentConfig,
    pub recommend: RecommendConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Volumes requested per page.
    pub page_size: usize,
    /// Upper bound on volumes fetched for a title/author query.
    pub max_title_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    pub max_recommendations: usize,
    pub per_category_limit: usize,
    /// Only search the N most frequent categories. All of them when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_categories: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Minimum spacing between two requests to the same service.
    pub min_interval_ms: u64,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/books/v1".to_string(),
            api_key: None,
            page_size: 40,
            max_title_results: 200,
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://openlibrary.org".to_string(),
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            per_category_limit: DEFAULT_PER_CATEGORY_LIMIT,
            top_categories: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("bookscout/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            min_interval_ms: 100,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/bookscout/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("BOOKSCOUT_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bookscout")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.catalog.page_size == 0 {
            return Err(CoreError::ConfigError(
                "catalog.page_size must be positive".to_string(),
            ));
        }
        if self.recommend.max_recommendations == 0 {
            return Err(CoreError::ConfigError(
                "recommend.max_recommendations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
