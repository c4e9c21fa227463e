use serde::Serialize;

use crate::categories::{CategoryTally, tally};
use crate::config::AppConfig;
use crate::error::{CoreError, Result};
use crate::models::BookRecord;
use crate::recommend::{Recommendation, Recommender};
use crate::source::{CatalogSource, Enricher, enrich_all};

/// Everything one recommendation run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Books matching the title/author query, after enrichment.
    pub books: Vec<BookRecord>,
    pub categories: CategoryTally,
    pub recommendations: Vec<Recommendation>,
}

/// Title/author search, enrichment, category tally, then category-based ranking.
pub struct Pipeline<'a> {
    catalog: &'a dyn CatalogSource,
    enricher: Option<&'a dyn Enricher>,
    recommender: Recommender,
    max_title_results: usize,
    top_categories: Option<usize>,
}

impl<'a> Pipeline<'a> {
    pub fn new(catalog: &'a dyn CatalogSource) -> Self {
        let config = AppConfig::default();
        Self {
            catalog,
            enricher: None,
            recommender: Recommender::new(),
            max_title_results: config.catalog.max_title_results,
            top_categories: config.recommend.top_categories,
        }
    }

    pub fn from_config(catalog: &'a dyn CatalogSource, config: &AppConfig) -> Self {
        Self {
            catalog,
            enricher: None,
            recommender: Recommender::new()
                .with_max_recommendations(config.recommend.max_recommendations)
                .with_per_category_limit(config.recommend.per_category_limit),
            max_title_results: config.catalog.max_title_results,
            top_categories: config.recommend.top_categories,
        }
    }

    pub fn with_enricher(mut self, enricher: &'a dyn Enricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_recommender(mut self, recommender: Recommender) -> Self {
        self.recommender = recommender;
        self
    }

    /// Override only the ranking cap, keeping the per-category limit already set.
    pub fn with_max_recommendations(mut self, max: usize) -> Self {
        self.recommender = std::mem::take(&mut self.recommender).with_max_recommendations(max);
        self
    }

    pub fn with_top_categories(mut self, top_categories: Option<usize>) -> Self {
        self.top_categories = top_categories;
        self
    }

    /// Fetch the matching books and attach supplementary subjects when an enricher is set.
    pub async fn gather(&self, title: &str, author: &str) -> Vec<BookRecord> {
        let books = self
            .catalog
            .fetch_by_title_author(title, author, self.max_title_results)
            .await;
        tracing::info!(title, author, found = books.len(), "title/author search done");

        match self.enricher {
            Some(enricher) => enrich_all(books, enricher).await,
            None => books,
        }
    }

    pub async fn run(&self, title: &str, author: &str) -> Result<PipelineReport> {
        let books = self.gather(title, author).await;
        if books.is_empty() {
            return Err(CoreError::NoBooks);
        }

        let categories = tally(&books, self.top_categories)?;
        let recommendations = self
            .recommender
            .recommend_with_matches(&categories.categories(), self.catalog)
            .await?;

        Ok(PipelineReport {
            books,
            categories,
            recommendations,
        })
    }
}
