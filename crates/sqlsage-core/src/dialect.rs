//! Database-type tags
//!
//! Callers identify the database behind a query with a free-form tag
//! ("postgresql", "MySQL", "sqlite3", ...). This module maps those tags onto
//! the closed set of databases whose EXPLAIN syntax is known.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A database whose EXPLAIN syntax is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// PostgreSQL
    PostgreSql,
    /// MySQL / MariaDB
    MySql,
    /// SQLite
    Sqlite,
}

impl DatabaseType {
    /// All known database types
    pub const ALL: [DatabaseType; 3] = [Self::PostgreSql, Self::MySql, Self::Sqlite];

    /// Resolves a database-type tag, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for tags that do not name a known database.
    ///
    /// ```
    /// use sqlsage_core::DatabaseType;
    ///
    /// assert_eq!(DatabaseType::from_tag("PostgreSQL"), Some(DatabaseType::PostgreSql));
    /// assert_eq!(DatabaseType::from_tag("mongodb"), None);
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Some(Self::PostgreSql),
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Canonical lowercase tag
    pub fn tag(&self) -> &'static str {
        match self {
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Get display name for this database
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSql => "PostgreSQL",
            Self::MySql => "MySQL",
            Self::Sqlite => "SQLite",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
