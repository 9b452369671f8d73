//! Table and column extraction over the token stream

use crate::lexer::{Token, TokenKind, tokenize};

/// Keywords that close a SELECT list or FROM clause
const CLAUSE_TERMINATORS: &[&str] = &[
    "EXCEPT", "FETCH", "FOR", "FROM", "GROUP", "HAVING", "INTERSECT", "INTO", "LIMIT", "OFFSET",
    "ORDER", "RETURNING", "SET", "UNION", "VALUES", "WHERE", "WINDOW",
];

/// Keywords that separate table references inside a FROM clause
const JOIN_WORDS: &[&str] = &[
    "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "OUTER", "CROSS", "NATURAL",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    Select,
    From,
}

/// Extracts table references and SELECT-list columns
///
/// Only SELECT and FROM at the outermost parenthesis level are read. For
/// each, the following token group is split on commas (JOIN keywords count
/// as commas) and the last word of every piece is kept, so `orders o`
/// yields `o` and `COUNT(*) AS total` yields `total`.
pub fn extract_tables_and_columns(query: &str) -> (Vec<String>, Vec<String>) {
    let tokens = match tokenize(query) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::debug!(error = %e, "table extraction skipped");
            return (Vec::new(), Vec::new());
        }
    };

    let mut tables = Vec::new();
    let mut columns = Vec::new();
    let mut depth = 0usize;
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];

        if token.is_punct('(') {
            depth += 1;
        } else if token.is_punct(')') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.is_keyword("SELECT") {
            let (group, next) = collect_group(&tokens, index + 1, Clause::Select);
            columns.extend(split_references(&group));
            index = next;
            continue;
        } else if depth == 0 && token.is_keyword("FROM") {
            let (group, next) = collect_group(&tokens, index + 1, Clause::From);
            tables.extend(split_references(&group));
            index = next;
            continue;
        }

        index += 1;
    }

    (tables, columns)
}

/// Collects the text of the token group following a clause keyword.
///
/// Returns the group text and the index of the first token after it.
fn collect_group(tokens: &[Token], start: usize, clause: Clause) -> (String, usize) {
    let mut text = String::new();
    let mut depth = 0usize;
    let mut in_join_predicate = false;
    let mut index = start;

    while index < tokens.len() {
        let token = &tokens[index];

        if depth == 0 {
            if token.is_punct(';') || is_any_keyword(token, CLAUSE_TERMINATORS) {
                break;
            }
            if token.is_punct(')') {
                break;
            }

            match clause {
                Clause::Select => {
                    let leading = text.trim().is_empty();
                    if leading && (token.is_keyword("DISTINCT") || token.is_keyword("ALL")) {
                        index += 1;
                        continue;
                    }
                }
                Clause::From => {
                    if token.is_keyword("ON") || token.is_keyword("USING") {
                        in_join_predicate = true;
                        index += 1;
                        continue;
                    }
                    if token.is_punct(',') {
                        in_join_predicate = false;
                        text.push(',');
                        index += 1;
                        continue;
                    }
                    if is_any_keyword(token, JOIN_WORDS) {
                        in_join_predicate = false;
                        text.push(',');
                        index += 1;
                        continue;
                    }
                }
            }
        }

        if token.is_punct('(') {
            depth += 1;
        } else if token.is_punct(')') {
            depth -= 1;
        }

        if !in_join_predicate {
            text.push_str(&token.text);
        }
        index += 1;
    }

    (text, index)
}

fn is_any_keyword(token: &Token, words: &[&str]) -> bool {
    token.kind == TokenKind::Keyword && words.iter().any(|w| token.text.eq_ignore_ascii_case(w))
}

/// Splits a group on commas and keeps the last word of each piece
fn split_references(group: &str) -> Vec<String> {
    group
        .split(',')
        .filter_map(|piece| piece.split_whitespace().last())
        .map(String::from)
        .collect()
}
