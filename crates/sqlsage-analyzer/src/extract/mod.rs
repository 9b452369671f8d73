//! Structural Extractors
//!
//! Each extractor is a pure function from query text to a list of facts:
//! - `extract_tables_and_columns` - table references after FROM/JOIN and the SELECT list
//! - `extract_where_conditions` - top-level predicates of the WHERE clause
//! - `extract_join_conditions` - table expression and ON predicate of each JOIN
//! - `extract_order_by_columns` - ORDER BY expressions
//!
//! Extractors never fail. A clause that is missing or cannot be read
//! yields an empty list, and duplicates are kept in source order.
//!
//! # Example
//!
//! ```
//! use sqlsage_analyzer::extract::{extract_tables_and_columns, extract_where_conditions};
//!
//! let (tables, columns) = extract_tables_and_columns("SELECT id, name FROM customers");
//! assert_eq!(tables, vec!["customers"]);
//! assert_eq!(columns, vec!["id", "name"]);
//!
//! let conditions = extract_where_conditions("SELECT * FROM t WHERE a = 1 AND b = 2 OR c = 3");
//! assert_eq!(conditions, vec!["a = 1", "b = 2", "c = 3"]);
//! ```

mod conditions;
mod joins;
mod order_by;
mod tables;

pub use conditions::extract_where_conditions;
pub use joins::{JoinCondition, extract_join_conditions};
pub use order_by::extract_order_by_columns;
pub use tables::extract_tables_and_columns;

use serde::{Deserialize, Serialize};

/// Output of all four extractors for one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFacts {
    /// Tables referenced after FROM and JOIN
    pub tables: Vec<String>,
    /// Columns in the SELECT list
    pub columns: Vec<String>,
    pub where_conditions: Vec<String>,
    pub join_conditions: Vec<JoinCondition>,
    /// ORDER BY expressions, still carrying any ASC/DESC suffix
    pub order_by_columns: Vec<String>,
}

impl QueryFacts {
    /// Runs every extractor over `query`
    pub fn extract(query: &str) -> Self {
        let (tables, columns) = extract_tables_and_columns(query);
        Self {
            tables,
            columns,
            where_conditions: extract_where_conditions(query),
            join_conditions: extract_join_conditions(query),
            order_by_columns: extract_order_by_columns(query),
        }
    }

    /// Returns true if no extractor found anything
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.columns.is_empty()
            && self.where_conditions.is_empty()
            && self.join_conditions.is_empty()
            && self.order_by_columns.is_empty()
    }
}
