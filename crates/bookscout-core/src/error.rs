use thiserror::Error;

/// All errors that can occur in bookscout-core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("No categories provided")]
    NoCategories,

    #[error("No books provided")]
    NoBooks,

    #[error("No categories provided to search by")]
    NoCategoriesToSearch,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl CoreError {
    /// True for the errors raised when a caller hands the core an empty input.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NoCategories | Self::NoBooks | Self::NoCategoriesToSearch
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
