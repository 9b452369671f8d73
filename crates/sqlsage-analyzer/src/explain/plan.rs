//! Normalized Plan Model
//!
//! A small, vendor-neutral view of an execution plan. Each database's
//! EXPLAIN output is reduced to a tree of `PlanNode`s tagged with a coarse
//! `Operation`, which is all the insight rules look at.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlsage_core::DatabaseType;
use thiserror::Error;

/// Errors raised when a plan value does not have the expected shape
#[derive(Debug, Error)]
pub enum PlanShapeError {
    #[error("Missing {0} in EXPLAIN output")]
    Missing(&'static str),

    #[error("Invalid plan JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid plan structure: {0}")]
    InvalidStructure(String),
}

/// Coarse kind of work a plan node performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Reads every row of a table
    FullScan,
    /// Reads rows located through an index
    IndexScan,
    /// Answers from the index alone
    IndexOnlyScan,
    Join,
    Sort,
    Aggregate,
    Distinct,
    Subquery,
    Materialize,
    /// UNION, INTERSECT, EXCEPT and friends
    SetOp,
    Limit,
    Other,
}

impl Operation {
    /// Returns true for any operation that reads rows through an index
    pub fn uses_index(&self) -> bool {
        matches!(self, Self::IndexScan | Self::IndexOnlyScan)
    }
}

/// A single node of a normalized plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanNode {
    pub operation: Operation,
    /// The database's own name for the step, e.g. `Seq Scan` or `SEARCH orders USING INDEX ...`
    pub label: String,
    /// Table the node reads, if any
    pub relation: Option<String>,
    /// Index the node reads, if any
    pub index_name: Option<String>,
    /// Estimated rows, if the database reports them
    pub rows: Option<u64>,
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    pub fn new(operation: Operation, label: impl Into<String>) -> Self {
        Self {
            operation,
            label: label.into(),
            relation: None,
            index_name: None,
            rows: None,
            children: Vec::new(),
        }
    }

    /// Sets the relation/table name
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    /// Sets the index name
    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Sets the estimated rows
    pub fn with_rows(mut self, rows: u64) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Adds a child node
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(PlanNode::node_count).sum::<usize>()
    }
}

/// A normalized plan: zero or more root nodes for one database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTree {
    pub database: DatabaseType,
    pub roots: Vec<PlanNode>,
}

impl PlanTree {
    /// A plan with no nodes
    pub fn empty(database: DatabaseType) -> Self {
        Self {
            database,
            roots: Vec::new(),
        }
    }

    pub fn new(database: DatabaseType, root: PlanNode) -> Self {
        Self {
            database,
            roots: vec![root],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Returns an iterator over all nodes in the plan (depth-first)
    pub fn iter_nodes(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(&self.roots)
    }

    /// Number of nodes performing `operation`
    pub fn count(&self, operation: Operation) -> usize {
        self.iter_nodes()
            .filter(|node| node.operation == operation)
            .count()
    }

    /// Returns true if any node performs `operation`
    pub fn contains(&self, operation: Operation) -> bool {
        self.iter_nodes().any(|node| node.operation == operation)
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(PlanNode::node_count).sum()
    }
}

/// Iterator for traversing plan nodes depth-first
pub struct PlanNodeIterator<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> PlanNodeIterator<'a> {
    fn new(roots: &'a [PlanNode]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for PlanNodeIterator<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Converts a raw plan value returned by an executor into a `PlanTree`
///
/// Accepts what the EXPLAIN statements built by `explain_statement` return:
/// PostgreSQL `FORMAT JSON` documents, MySQL `FORMAT=JSON` documents, and
/// SQLite `EXPLAIN QUERY PLAN` rows. JSON documents may also arrive as a
/// string or wrapped in a single result row.
pub fn normalize_plan(plan: &Value, database: DatabaseType) -> Result<PlanTree, PlanShapeError> {
    match database {
        DatabaseType::PostgreSql => super::postgres::normalize(plan),
        DatabaseType::MySql => super::mysql::normalize(plan),
        DatabaseType::Sqlite => super::sqlite::normalize(plan),
    }
}

/// Parses a JSON document that was delivered as a string column
pub(crate) fn decode_embedded(value: &Value) -> Result<Option<Value>, PlanShapeError> {
    match value.as_str() {
        Some(text) => Ok(Some(serde_json::from_str(text.trim())?)),
        None => Ok(None),
    }
}

/// Reads a row estimate that may be an integer, a float, or a numeric string
pub(crate) fn read_rows(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests;
