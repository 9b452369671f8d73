//! EXPLAIN statement construction

use sqlsage_core::{DatabaseType, SqlsageError};
use thiserror::Error;

/// Errors from execution plan generation
#[derive(Debug, Error)]
pub enum PlanError {
    /// No EXPLAIN syntax is known for the database-type tag
    #[error("Execution plan not supported for {0} databases")]
    UnsupportedDatabase(String),

    /// The executor failed to run the EXPLAIN statement
    #[error("Error generating execution plan: {0}")]
    Execution(#[from] SqlsageError),
}

impl PlanError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedDatabase(_))
    }
}

/// Wraps `query` in the EXPLAIN form for `database`
///
/// | Database | Statement |
/// |---|---|
/// | PostgreSQL | `EXPLAIN (ANALYZE, COSTS, VERBOSE, BUFFERS, FORMAT JSON) <query>` |
/// | MySQL | `EXPLAIN FORMAT=JSON <query>` |
/// | SQLite | `EXPLAIN QUERY PLAN <query>` |
///
/// The PostgreSQL form runs the query (`ANALYZE`).
pub fn explain_command(database: DatabaseType, query: &str) -> String {
    match database {
        DatabaseType::PostgreSql => {
            format!("EXPLAIN (ANALYZE, COSTS, VERBOSE, BUFFERS, FORMAT JSON) {query}")
        }
        DatabaseType::MySql => format!("EXPLAIN FORMAT=JSON {query}"),
        DatabaseType::Sqlite => format!("EXPLAIN QUERY PLAN {query}"),
    }
}

/// Resolves a database-type tag and builds its EXPLAIN statement
///
/// # Example
///
/// ```
/// use sqlsage_analyzer::explain::{explain_statement, PlanError};
///
/// let statement = explain_statement("sqlite", "SELECT * FROM users").unwrap();
/// assert_eq!(statement, "EXPLAIN QUERY PLAN SELECT * FROM users");
///
/// let err = explain_statement("oracle", "SELECT 1").unwrap_err();
/// assert!(matches!(err, PlanError::UnsupportedDatabase(_)));
/// ```
pub fn explain_statement(database_tag: &str, query: &str) -> Result<String, PlanError> {
    let database = resolve_database(database_tag)?;
    Ok(explain_command(database, query))
}

pub(crate) fn resolve_database(database_tag: &str) -> Result<DatabaseType, PlanError> {
    DatabaseType::from_tag(database_tag)
        .ok_or_else(|| PlanError::UnsupportedDatabase(database_tag.to_string()))
}
