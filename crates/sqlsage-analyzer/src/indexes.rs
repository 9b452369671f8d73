//! Index Recommendation Engine
//!
//! Turns extracted query facts into `CREATE INDEX` suggestions, grouped by
//! table and keyed by a synthesized index name `idx_<table>_<column>`.
//!
//! Recommendations are produced in three passes, in this order:
//! 1. WHERE conditions: the column left of the first comparison operator
//! 2. JOIN conditions: both sides of a `t1.c1 = t2.c2` equality
//! 3. ORDER BY columns, with any ASC/DESC suffix removed
//!
//! Table attribution is not schema-aware. A WHERE or ORDER BY column is
//! recommended under every table the query references, so queries over
//! several tables get a recommendation per table.
//!
//! If a `(table, index name)` key is produced twice, the first
//! recommendation is kept and later ones are dropped.

use crate::extract::QueryFacts;
use indexmap::IndexMap;
use indexmap::map::Entry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Operators are matched case-sensitively, so a lowercase `like`/`in` is not recognized
static CONDITION_COLUMN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)\s*(?:=|>|<|>=|<=|!=|<>|LIKE|IN)").expect("valid regex")
});

static JOIN_EQUALITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)\.(\w+)\s*=\s*(\w+)\.(\w+)").expect("valid regex")
});

static SORT_DIRECTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:ASC|DESC)$").expect("valid regex"));

/// A suggested single-column index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecommendation {
    /// Indexed columns, in index order
    pub columns: Vec<String>,
    /// Why the index was suggested
    pub reason: String,
    /// Ready-to-run DDL
    pub create_statement: String,
}

impl IndexRecommendation {
    fn single_column(index_name: &str, table: &str, column: &str, reason: String) -> Self {
        Self {
            columns: vec![column.to_string()],
            reason,
            create_statement: format!("CREATE INDEX {index_name} ON {table} ({column});"),
        }
    }
}

/// Recommendations grouped by table, then by index name
///
/// Tables and indexes keep the order in which they were first recommended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexRecommendations(IndexMap<String, IndexMap<String, IndexRecommendation>>);

impl IndexRecommendations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recommendation for `index_name` on `table`
    pub fn get(&self, table: &str, index_name: &str) -> Option<&IndexRecommendation> {
        self.0.get(table).and_then(|indexes| indexes.get(index_name))
    }

    /// Get every recommendation for one table
    pub fn for_table(&self, table: &str) -> Option<&IndexMap<String, IndexRecommendation>> {
        self.0.get(table)
    }

    /// Iterate over `(table, index name, recommendation)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &IndexRecommendation)> + '_ {
        self.0.iter().flat_map(|(table, indexes)| {
            indexes
                .iter()
                .map(move |(name, rec)| (table.as_str(), name.as_str(), rec))
        })
    }

    /// Tables that received at least one recommendation
    pub fn tables(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Total number of recommendations across all tables
    pub fn len(&self) -> usize {
        self.0.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All `CREATE INDEX` statements, in insertion order
    pub fn create_statements(&self) -> Vec<&str> {
        self.iter()
            .map(|(_, _, rec)| rec.create_statement.as_str())
            .collect()
    }

    /// Inserts a single-column recommendation unless the key already exists
    fn insert_first(&mut self, table: &str, column: &str, reason: impl FnOnce() -> String) {
        let index_name = format!("idx_{table}_{column}");
        let indexes = self.0.entry(table.to_string()).or_default();

        if let Entry::Vacant(slot) = indexes.entry(index_name) {
            let rec = IndexRecommendation::single_column(slot.key(), table, column, reason());
            slot.insert(rec);
        }
    }
}

/// Generates index recommendations from extracted query facts
///
/// # Example
///
/// ```
/// use sqlsage_analyzer::extract::QueryFacts;
/// use sqlsage_analyzer::indexes::generate_index_recommendations;
///
/// let facts = QueryFacts::extract("SELECT * FROM orders WHERE customer_id = 5");
/// let recs = generate_index_recommendations(&facts);
///
/// let rec = recs.get("orders", "idx_orders_customer_id").unwrap();
/// assert_eq!(rec.create_statement, "CREATE INDEX idx_orders_customer_id ON orders (customer_id);");
/// ```
pub fn generate_index_recommendations(facts: &QueryFacts) -> IndexRecommendations {
    let mut recommendations = IndexRecommendations::new();

    for condition in &facts.where_conditions {
        let Some(column) = CONDITION_COLUMN_REGEX
            .captures(condition)
            .and_then(|caps| caps.get(1))
        else {
            continue;
        };

        for table in &facts.tables {
            recommendations.insert_first(table, column.as_str(), || {
                format!("Used in WHERE condition: {condition}")
            });
        }
    }

    for join in &facts.join_conditions {
        let Some(caps) = JOIN_EQUALITY_REGEX.captures(&join.condition) else {
            continue;
        };

        for (table, column) in [(&caps[1], &caps[2]), (&caps[3], &caps[4])] {
            recommendations.insert_first(table, column, || {
                format!("Used in JOIN condition: {}", join.condition)
            });
        }
    }

    for order_column in &facts.order_by_columns {
        let column = SORT_DIRECTION_REGEX.replace(order_column, "");

        for table in &facts.tables {
            recommendations.insert_first(table, &column, || "Used in ORDER BY clause".to_string());
        }
    }

    tracing::debug!(
        tables = facts.tables.len(),
        recommendations = recommendations.len(),
        "generated index recommendations"
    );

    recommendations
}

#[cfg(test)]
mod tests;
