//! Lexical Pass
//!
//! Wraps the `sqlparser` tokenizer and classifies its output into the
//! coarse token kinds the extractors work with. Keyword classification
//! uses a short list of clause and operator words rather than sqlparser's
//! full keyword table, which also contains common column names such as
//! `name`, `id` and `date`.
//!
//! # Example
//!
//! ```
//! use sqlsage_analyzer::lexer::{tokenize, TokenKind};
//!
//! let tokens = tokenize("SELECT name FROM users").unwrap();
//! let kinds: Vec<_> = tokens
//!     .iter()
//!     .filter(|t| !t.is_whitespace())
//!     .map(|t| t.kind)
//!     .collect();
//!
//! assert_eq!(
//!     kinds,
//!     vec![TokenKind::Keyword, TokenKind::Identifier, TokenKind::Keyword, TokenKind::Identifier]
//! );
//! ```

use crate::config::FormatterSettings;
use serde::{Deserialize, Serialize};
use sqlparser::dialect::GenericDialect;
use sqlparser::tokenizer::{Token as SqlToken, Tokenizer};
use thiserror::Error;

/// Words treated as keywords by the lexical pass
const RESERVED_WORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CREATE", "CROSS", "DELETE",
    "DESC", "DISTINCT", "DROP", "ELSE", "END", "EXCEPT", "EXISTS", "FETCH", "FOR", "FROM",
    "FULL", "GROUP", "HAVING", "IN", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN",
    "LEFT", "LIKE", "LIMIT", "NATURAL", "NOT", "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER",
    "OVER", "PARTITION", "RETURNING", "RIGHT", "SELECT", "SET", "THEN", "UNION", "UPDATE",
    "USING", "VALUES", "WHEN", "WHERE", "WINDOW", "WITH",
];

/// Errors produced by the lexical pass
#[derive(Debug, Error)]
pub enum LexError {
    #[error("Failed to tokenize query: {0}")]
    Tokenize(String),
}

/// Errors produced when pretty-printing a query
#[derive(Debug, Error)]
pub enum FormatError {
    /// The SQL input is empty
    #[error("empty SQL input")]
    EmptyInput,
}

/// Coarse classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Keyword,
    Identifier,
    Punctuation,
    Literal,
    Whitespace,
    /// Operators and anything else
    Other,
}

/// A classified token with its position in the token stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token
    pub text: String,
    /// Zero-based position in the token stream
    pub position: usize,
}

impl Token {
    /// Returns true if this is a keyword equal to `word` (case-insensitive)
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(word)
    }

    /// Returns true if this token is whitespace or a comment
    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Returns true if this is the given punctuation character
    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punctuation && self.text.len() == 1 && self.text.starts_with(ch)
    }
}

/// Returns true if `word` is one of the keywords recognized by the lexical pass
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(word))
}

/// Tokenizes a query into classified tokens, whitespace included
pub fn tokenize(query: &str) -> Result<Vec<Token>, LexError> {
    let dialect = GenericDialect {};
    let raw = Tokenizer::new(&dialect, query)
        .tokenize()
        .map_err(|e| LexError::Tokenize(e.to_string()))?;

    let tokens = raw
        .into_iter()
        .filter(|token| !matches!(token, SqlToken::EOF))
        .enumerate()
        .map(|(position, token)| Token {
            kind: classify(&token),
            text: token.to_string(),
            position,
        })
        .collect();

    Ok(tokens)
}

fn classify(token: &SqlToken) -> TokenKind {
    match token {
        SqlToken::Word(word) => {
            if word.quote_style.is_none() && is_reserved_word(&word.value) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            }
        }
        SqlToken::Number(_, _)
        | SqlToken::SingleQuotedString(_)
        | SqlToken::NationalStringLiteral(_)
        | SqlToken::HexStringLiteral(_)
        | SqlToken::Placeholder(_) => TokenKind::Literal,
        SqlToken::Whitespace(_) => TokenKind::Whitespace,
        SqlToken::Comma
        | SqlToken::SemiColon
        | SqlToken::LParen
        | SqlToken::RParen
        | SqlToken::Period => TokenKind::Punctuation,
        _ => TokenKind::Other,
    }
}

/// Kind of statement, taken from the first keyword of the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Alter,
    Drop,
    /// Statement starting with a common table expression
    With,
    Unknown,
}

impl QueryType {
    /// Returns the statement type as an uppercase keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Drop => "DROP",
            Self::With => "WITH",
            Self::Unknown => "UNKNOWN",
        }
    }

    fn from_keyword(word: &str) -> Self {
        match word.to_ascii_uppercase().as_str() {
            "SELECT" => Self::Select,
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            "CREATE" => Self::Create,
            "ALTER" => Self::Alter,
            "DROP" => Self::Drop,
            "WITH" => Self::With,
            _ => Self::Unknown,
        }
    }
}

/// Determines the statement type of a query
///
/// Leading whitespace, comments and opening parentheses are skipped.
/// A leading `WITH` reports the statement that follows the CTE list, or
/// `With` when there is none. Queries that cannot be tokenized are `Unknown`.
pub fn query_type(query: &str) -> QueryType {
    let Ok(tokens) = tokenize(query) else {
        return QueryType::Unknown;
    };

    let Some(position) = tokens
        .iter()
        .position(|t| !t.is_whitespace() && !t.is_punct('('))
    else {
        return QueryType::Unknown;
    };
    let first = &tokens[position];
    if first.kind != TokenKind::Keyword {
        return QueryType::Unknown;
    }

    match QueryType::from_keyword(&first.text) {
        QueryType::With => statement_after_ctes(&tokens[position + 1..]),
        other => other,
    }
}

fn statement_after_ctes(tokens: &[Token]) -> QueryType {
    let mut depth = 0usize;
    for token in tokens {
        if token.is_punct('(') {
            depth += 1;
        } else if token.is_punct(')') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.kind == TokenKind::Keyword {
            let statement = QueryType::from_keyword(&token.text);
            if matches!(
                statement,
                QueryType::Select | QueryType::Insert | QueryType::Update | QueryType::Delete
            ) {
                return statement;
            }
        }
    }
    QueryType::With
}

/// Pretty-prints a query with one clause per line
///
/// # Example
///
/// ```
/// use sqlsage_analyzer::config::FormatterSettings;
/// use sqlsage_analyzer::lexer::format_query;
///
/// let formatted = format_query("select id from users where id=1", &FormatterSettings::default()).unwrap();
/// assert!(formatted.contains("SELECT"));
/// assert!(formatted.contains("WHERE"));
/// ```
pub fn format_query(query: &str, settings: &FormatterSettings) -> Result<String, FormatError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(FormatError::EmptyInput);
    }

    let options = sqlformat::FormatOptions {
        indent: sqlformat::Indent::Spaces(settings.indent_size.min(u8::MAX as usize) as u8),
        uppercase: Some(settings.uppercase_keywords),
        ..Default::default()
    };
    let formatted = sqlformat::format(trimmed, &Default::default(), &options);

    Ok(formatted.replace("\r\n", "\n").trim_end().to_string())
}
