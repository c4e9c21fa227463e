use serde_json::Value;

pub mod google_books;
pub mod openlibrary;

/// Strings of a JSON array, also accepting `{"name": ...}` objects. Anything else is skipped.
pub(crate) fn string_list(v: Option<&Value>) -> Vec<String> {
    v.and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|item| {
                    item.as_str()
                        .or_else(|| item.get("name").and_then(Value::as_str))
                })
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_list_mixed_items() {
        let v = json!(["Fiction", {"name": "Spain"}, 42, {"url": "x"}]);
        assert_eq!(string_list(Some(&v)), vec!["Fiction", "Spain"]);
        assert!(string_list(None).is_empty());
        assert!(string_list(Some(&json!("scalar"))).is_empty());
    }
}
