//! Plan executor trait
//!
//! SQLSage never opens database connections itself. Callers that want an
//! execution plan hand the analyzer a `PlanExecutor`, which receives one
//! fully formed EXPLAIN statement and returns the plan as JSON.

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Runs EXPLAIN-family statements against a live database
#[async_trait]
pub trait PlanExecutor: Send + Sync {
    /// Execute an EXPLAIN statement and return the plan it produced.
    ///
    /// The returned value is whatever the database reported (a JSON plan
    /// document, or the rows of a query-plan result set rendered as JSON).
    /// Any failure, including an invalid underlying query, is reported as
    /// an error.
    async fn execute(&self, statement: &str) -> Result<Value>;
}
