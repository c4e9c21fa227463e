use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, Result};

static PARENTHETICAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));

/// Substrings treated as category separators. `and` is matched as plain text,
/// so it also splits words that merely contain it ("Grandmother" -> "Gr", "mother").
const DELIMITERS: [&str; 5] = ["&", "/", "-", ":", "and"];

const STOP_PHRASE: &str = "general";

/// Normalize raw category labels into canonical lowercase tokens.
///
/// Output keeps input order (raw string order, then split order) and is not
/// deduplicated. An empty input is an error: it means nothing upstream produced
/// any category data.
pub fn normalize<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>> {
    if raw.is_empty() {
        return Err(CoreError::NoCategories);
    }

    let mut cleaned = Vec::new();
    for label in raw {
        cleaned.extend(split_label(label.as_ref()));
    }
    Ok(cleaned)
}

fn split_label(label: &str) -> Vec<String> {
    let mut stripped = PARENTHETICAL_RE
        .replace_all(label, "")
        .replace(['(', ')'], "");
    for delimiter in DELIMITERS {
        stripped = stripped.replace(delimiter, ",");
    }

    stripped
        .split(',')
        .map(clean_subcategory)
        .filter(|sub| !sub.is_empty())
        .collect()
}

fn clean_subcategory(sub: &str) -> String {
    let lowered = sub.to_lowercase();
    let trimmed = lowered.trim();
    if trimmed.contains(STOP_PHRASE) {
        trimmed.replace(STOP_PHRASE, "").trim().to_string()
    } else {
        trimmed.to_string()
    }
}
