//! PostgreSQL plan normalization
//!
//! Reads the output of `EXPLAIN (..., FORMAT JSON)`:
//!
//! ```json
//! [{"Plan": {"Node Type": "Seq Scan", "Relation Name": "users", "Plan Rows": 100}}]
//! ```
//!
//! Drivers that return the result set as rows hand back
//! `[{"QUERY PLAN": [...]}]` or the document as a string; both are unwrapped.

use super::plan::{Operation, PlanNode, PlanShapeError, PlanTree, decode_embedded, read_rows};
use serde_json::Value;
use sqlsage_core::DatabaseType;

const RESULT_COLUMN: &str = "QUERY PLAN";

pub(crate) fn normalize(value: &Value) -> Result<PlanTree, PlanShapeError> {
    let plan = find_plan(value)?;
    let root = read_node(&plan)?;
    Ok(PlanTree::new(DatabaseType::PostgreSql, root))
}

fn find_plan(value: &Value) -> Result<Value, PlanShapeError> {
    if let Some(decoded) = decode_embedded(value)? {
        return find_plan(&decoded);
    }

    if let Some(plan) = value.get("Plan") {
        return Ok(plan.clone());
    }

    if let Some(column) = value.get(RESULT_COLUMN) {
        return find_plan(column);
    }

    // PostgreSQL JSON EXPLAIN wraps the plan in an array
    match value.as_array().and_then(|items| items.first()) {
        Some(first) => find_plan(first),
        None => Err(PlanShapeError::Missing("Plan object")),
    }
}

fn read_node(value: &Value) -> Result<PlanNode, PlanShapeError> {
    let node_type = value
        .get("Node Type")
        .and_then(Value::as_str)
        .ok_or_else(|| PlanShapeError::InvalidStructure("Missing Node Type".into()))?;

    let mut node = PlanNode::new(operation_for(node_type), node_type);

    if let Some(relation) = value.get("Relation Name").and_then(Value::as_str) {
        node.relation = Some(relation.to_string());
    }
    if let Some(index) = value.get("Index Name").and_then(Value::as_str) {
        node.index_name = Some(index.to_string());
    }
    node.rows = read_rows(value.get("Plan Rows"));

    if let Some(plans) = value.get("Plans").and_then(Value::as_array) {
        for child in plans {
            node.children.push(read_node(child)?);
        }
    }

    Ok(node)
}

fn operation_for(node_type: &str) -> Operation {
    match node_type {
        "Seq Scan" | "Parallel Seq Scan" => Operation::FullScan,
        "Index Scan" | "Bitmap Index Scan" | "Bitmap Heap Scan" => Operation::IndexScan,
        "Index Only Scan" => Operation::IndexOnlyScan,
        "Nested Loop" | "Hash Join" | "Merge Join" => Operation::Join,
        "Sort" | "Incremental Sort" => Operation::Sort,
        "Aggregate" | "GroupAggregate" | "HashAggregate" | "WindowAgg" | "Group" => {
            Operation::Aggregate
        }
        "Unique" => Operation::Distinct,
        "Subquery Scan" | "CTE Scan" | "SubPlan" => Operation::Subquery,
        "Materialize" | "Memoize" => Operation::Materialize,
        "Append" | "Merge Append" | "SetOp" | "Recursive Union" => Operation::SetOp,
        "Limit" => Operation::Limit,
        _ => Operation::Other,
    }
}
