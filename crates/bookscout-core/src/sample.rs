use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::BookRecord;

pub const DEFAULT_SAMPLE_FILE: &str = "book_sample.json";

/// Save books as a pretty-printed JSON array.
pub fn save_sample(path: &Path, books: &[BookRecord]) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(books)?;
    fs::write(path, json)?;
    Ok(path.to_path_buf())
}

/// Load a JSON array of books written by [`save_sample`] (or by hand).
pub fn load_sample(path: &Path) -> Result<Vec<BookRecord>> {
    let contents = fs::read_to_string(path)?;
    let books: Vec<BookRecord> = serde_json::from_str(&contents)?;
    Ok(books)
}
