//! ORDER BY extraction

use regex::Regex;
use std::sync::LazyLock;

static ORDER_BY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bORDER\s+BY\b(.*?)(?:\bLIMIT\b|\z)").expect("valid regex")
});

/// Extracts the ORDER BY expressions of the first ORDER BY clause
///
/// Pieces keep any ASC/DESC suffix; stripping it is left to consumers.
pub fn extract_order_by_columns(query: &str) -> Vec<String> {
    let Some(clause) = ORDER_BY_REGEX.captures(query).and_then(|caps| caps.get(1)) else {
        return Vec::new();
    };

    clause
        .as_str()
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(String::from)
        .collect()
}
