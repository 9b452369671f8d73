//! Execution Plan Module
//!
//! This module turns a query into an execution plan report:
//! - `explain_statement` picks the EXPLAIN syntax for a database-type tag
//! - `generate_execution_plan` runs it through a `PlanExecutor`
//! - `normalize_plan` reduces PostgreSQL, MySQL and SQLite output to a `PlanTree`
//! - `PlanInterpreter` applies insight rules to the tree
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sqlsage_analyzer::config::PlanThresholds;
//! use sqlsage_analyzer::explain::{InsightCategory, PlanInterpreter};
//! use sqlsage_core::DatabaseType;
//!
//! let plan = json!([{"Plan": {"Node Type": "Seq Scan", "Relation Name": "users", "Plan Rows": 50000}}]);
//!
//! let interpreter = PlanInterpreter::builtin(PlanThresholds::default());
//! let insights = interpreter.interpret(&plan, DatabaseType::PostgreSql);
//!
//! assert_eq!(insights.get(InsightCategory::MajorConcerns).len(), 1);
//! ```

mod command;
mod generate;
mod insights;
mod mysql;
mod plan;
mod postgres;
mod sqlite;

pub use command::{PlanError, explain_command, explain_statement};
pub use generate::{ExecutionPlanReport, generate_execution_plan};
pub use insights::{
    FullScanRule, IndexUsageRule, InsightCategory, InsightRule, InsightSeverity, JoinOrderRule,
    PlanInsight, PlanInsights, PlanInterpreter, SampleInsightRule, SortRule,
};
pub use plan::{
    Operation, PlanNode, PlanNodeIterator, PlanShapeError, PlanTree, normalize_plan,
};
