use std::fmt::Write;

use bookscout_core::{BookRecord, CategoryTally, Recommendation};

const NOT_AVAILABLE: &str = "N/A";

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

pub fn banner(text: &str) -> String {
    format!("{eq}{text}{eq}", eq = "=".repeat(10))
}

/// The short listing used for recommendations and sample files.
pub fn book_info(book: &BookRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "-".repeat(20));
    let _ = writeln!(out, "Title: {}", book.title);
    let _ = writeln!(out, "Author(s): {}", book.authors_display());
    let _ = writeln!(out, "Publisher: {}", or_na(book.publisher.as_deref()));
    let _ = writeln!(out, "Published Date: {}", or_na(book.published_date.as_deref()));
    let _ = writeln!(out, "ISBN-13: {}", or_na(book.isbn13.as_deref()));
    out
}

/// The listing for title/author search results, including catalog categories.
pub fn volume_info(book: &BookRecord) -> String {
    let categories = if book.categories.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        book.categories.join(", ")
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", "-".repeat(20));
    let _ = writeln!(out, "Title: {}", book.title);
    let _ = writeln!(out, "Author(s): {}", book.authors_display());
    let _ = writeln!(out, "Publisher: {}", or_na(book.publisher.as_deref()));
    let _ = writeln!(out, "Published Date: {}", or_na(book.published_date.as_deref()));
    let _ = writeln!(out, "Main Category: {}", or_na(book.main_category.as_deref()));
    let _ = writeln!(out, "Categories: {categories}");
    let _ = writeln!(out, "ISBN-13: {}", or_na(book.isbn13.as_deref()));
    out
}

pub fn tally_lines(tally: &CategoryTally) -> String {
    let width = tally.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, count) in tally.iter() {
        let _ = writeln!(out, "  {name:<width$}  {count}");
    }
    out
}

pub fn print_books(books: &[BookRecord]) {
    for book in books {
        print!("{}", book_info(book));
    }
}

pub fn print_recommendations(recommendations: &[Recommendation]) {
    for rec in recommendations {
        print!("{}", book_info(&rec.book));
        println!("Matched: {}", rec.matched_categories.join(", "));
    }
}
