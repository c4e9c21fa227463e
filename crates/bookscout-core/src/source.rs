use async_trait::async_trait;

use crate::models::BookRecord;

/// A book catalog that can be queried by title/author or by subject.
///
/// Implementations paginate internally and absorb transport failures: a failed
/// page ends the listing and whatever was collected so far is returned.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_by_title_author(
        &self,
        title: &str,
        author: &str,
        max_to_fetch: usize,
    ) -> Vec<BookRecord>;

    /// Books filed under `category`. Empty when the catalog has no match.
    async fn fetch_by_category(&self, category: &str, max_to_fetch: usize) -> Vec<BookRecord>;
}

/// Attaches supplementary subjects to a record. On any failure the record comes back unchanged.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, book: BookRecord) -> BookRecord;
}

/// Enrich every book in order, one request at a time.
pub async fn enrich_all(books: Vec<BookRecord>, enricher: &dyn Enricher) -> Vec<BookRecord> {
    let mut enriched = Vec::with_capacity(books.len());
    for book in books {
        enriched.push(enricher.enrich(book).await);
    }
    enriched
}
