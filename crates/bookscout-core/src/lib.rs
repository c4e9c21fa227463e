//! Bookscout core: book records, category taxonomy and category-based recommendations.

pub mod categories;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod recommend;
pub mod sample;
pub mod source;

pub use categories::{CategoryTally, normalize, tally};
pub use config::AppConfig;
pub use error::{CoreError, Result};
pub use models::*;
pub use pipeline::{Pipeline, PipelineReport};
pub use recommend::{MatchAccumulator, Recommendation, Recommender};
pub use source::{CatalogSource, Enricher, enrich_all};
