//! WHERE clause extraction

use regex::Regex;
use std::sync::LazyLock;

// WHERE body runs until GROUP BY, ORDER BY, LIMIT or the end of the text
static WHERE_CLAUSE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bWHERE\b(.*?)(?:\bGROUP\s+BY\b|\bORDER\s+BY\b|\bLIMIT\b|\z)")
        .expect("valid regex")
});

static BOOLEAN_CONNECTOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:AND|OR)\b").expect("valid regex"));

/// Extracts the individual predicates of the first WHERE clause
///
/// The clause is split on every AND/OR; parenthesized groups are not
/// treated specially, so nested boolean structure is flattened. Connectors
/// are dropped and empty pieces are skipped.
pub fn extract_where_conditions(query: &str) -> Vec<String> {
    let Some(clause) = WHERE_CLAUSE_REGEX
        .captures(query)
        .and_then(|caps| caps.get(1))
    else {
        return Vec::new();
    };

    BOOLEAN_CONNECTOR_REGEX
        .split(clause.as_str().trim())
        .map(str::trim)
        .filter(|condition| !condition.is_empty())
        .map(String::from)
        .collect()
}
