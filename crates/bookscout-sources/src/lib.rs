//! Bookscout sources: Google Books catalog and Open Library enrichment adapters.

pub mod error;
pub mod http;
pub mod sources;

pub use error::{Result, SourceError};
pub use sources::google_books::GoogleBooksSource;
pub use sources::openlibrary::OpenLibrarySource;
