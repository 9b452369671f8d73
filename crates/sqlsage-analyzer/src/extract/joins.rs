//! JOIN condition extraction

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Any JOIN keyword, including its INNER/LEFT/RIGHT/FULL/OUTER/CROSS/NATURAL prefix
static JOIN_KEYWORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(?:INNER|LEFT|RIGHT|FULL|OUTER|CROSS|NATURAL)\s+)*JOIN\b")
        .expect("valid regex")
});

// Where an ON predicate stops: the next join or a later clause
static PREDICATE_BOUNDARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:(?:INNER|LEFT|RIGHT|FULL|OUTER|CROSS|NATURAL)\s+)*JOIN|WHERE|GROUP\s+BY|ORDER\s+BY|LIMIT)\b",
    )
    .expect("valid regex")
});

static ON_KEYWORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bON\b").expect("valid regex"));

/// The table expression and ON predicate of one JOIN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCondition {
    /// Raw text between the JOIN keyword and ON, e.g. `customers c`
    pub table: String,
    /// Raw text between ON and the next top-level clause boundary
    pub condition: String,
}

impl JoinCondition {
    pub fn new(table: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            condition: condition.into(),
        }
    }
}

/// Extracts one entry per `JOIN ... ON ...` occurrence, in source order
///
/// ON is searched outside parentheses, so a derived table may carry its own
/// WHERE or JOIN. Joins whose next top-level keyword is another join or a
/// later clause (CROSS JOIN, NATURAL JOIN, `USING (...)`) produce no entry.
pub fn extract_join_conditions(query: &str) -> Vec<JoinCondition> {
    let mut joins = Vec::new();

    for keyword in JOIN_KEYWORD_REGEX.find_iter(query) {
        let rest = &query[keyword.end()..];
        let rest = &rest[..enclosing_close(rest).unwrap_or(rest.len())];

        let Some(on) = find_top_level(rest, &ON_KEYWORD_REGEX) else {
            continue;
        };
        let table = &rest[..on.start()];
        if find_top_level(table, &PREDICATE_BOUNDARY_REGEX).is_some() {
            continue;
        }

        let predicate = &rest[on.end()..];
        let end = find_top_level(predicate, &PREDICATE_BOUNDARY_REGEX)
            .map_or(predicate.len(), |boundary| boundary.start());

        joins.push(JoinCondition::new(table.trim(), predicate[..end].trim()));
    }

    joins
}

/// First match of `regex` that is not nested inside parentheses
fn find_top_level<'t>(text: &'t str, regex: &Regex) -> Option<regex::Match<'t>> {
    regex
        .find_iter(text)
        .find(|m| paren_depth(&text[..m.start()]) == 0)
}

fn paren_depth(text: &str) -> isize {
    text.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}

/// Offset of the `)` closing a parenthesis opened before `text` starts
fn enclosing_close(text: &str) -> Option<usize> {
    let mut depth = 0isize;
    for (offset, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}
