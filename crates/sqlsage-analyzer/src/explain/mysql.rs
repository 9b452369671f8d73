//! MySQL plan normalization
//!
//! Reads the output of `EXPLAIN FORMAT=JSON`. MySQL nests the plan under
//! `query_block`, wrapping table accesses in `ordering_operation`,
//! `grouping_operation` and `duplicates_removal` objects, and lists joined
//! tables flat in a `nested_loop` array.
//!
//! Drivers usually return the document as a single `EXPLAIN` column holding
//! a JSON string; that wrapping is removed first.

use super::plan::{Operation, PlanNode, PlanShapeError, PlanTree, decode_embedded, read_rows};
use serde_json::Value;
use sqlsage_core::DatabaseType;

const RESULT_COLUMN: &str = "EXPLAIN";

pub(crate) fn normalize(value: &Value) -> Result<PlanTree, PlanShapeError> {
    let document = find_document(value)?;
    let query_block = document
        .get("query_block")
        .ok_or(PlanShapeError::Missing("query_block"))?;

    let root = read_query_block(query_block)?;
    Ok(PlanTree::new(DatabaseType::MySql, root))
}

fn find_document(value: &Value) -> Result<Value, PlanShapeError> {
    if let Some(decoded) = decode_embedded(value)? {
        return find_document(&decoded);
    }

    if value.get("query_block").is_some() {
        return Ok(value.clone());
    }

    if let Some(column) = value.get(RESULT_COLUMN) {
        return find_document(column);
    }

    match value.as_array().and_then(|rows| rows.first()) {
        Some(first) => find_document(first),
        None => Err(PlanShapeError::Missing("query_block")),
    }
}

/// Reads one `query_block`, or any wrapper object nested inside it
fn read_query_block(block: &Value) -> Result<PlanNode, PlanShapeError> {
    if let Some(ordering) = block.get("ordering_operation") {
        // Without a filesort the rows already arrive in index order
        let sorts = ordering
            .get("using_filesort")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let node = if sorts {
            PlanNode::new(Operation::Sort, "ordering_operation (filesort)")
        } else {
            PlanNode::new(Operation::Other, "ordering_operation")
        };
        return Ok(node.with_child(read_query_block(ordering)?));
    }

    if let Some(grouping) = block.get("grouping_operation") {
        let node = PlanNode::new(Operation::Aggregate, "grouping_operation");
        return Ok(node.with_child(read_query_block(grouping)?));
    }

    if let Some(distinct) = block.get("duplicates_removal") {
        let node = PlanNode::new(Operation::Distinct, "duplicates_removal");
        return Ok(node.with_child(read_query_block(distinct)?));
    }

    if let Some(nested_loop) = block.get("nested_loop") {
        return read_nested_loop(nested_loop);
    }

    if let Some(table) = block.get("table") {
        return read_table(table);
    }

    if let Some(union) = block.get("union_result") {
        return read_union(union);
    }

    // SELECT without tables, e.g. `SELECT 1`
    Ok(PlanNode::new(Operation::Other, "query_block"))
}

/// MySQL lists joined tables in order; each one after the first adds a join
fn read_nested_loop(nested_loop: &Value) -> Result<PlanNode, PlanShapeError> {
    let entries = nested_loop
        .as_array()
        .ok_or_else(|| PlanShapeError::InvalidStructure("nested_loop is not an array".into()))?;

    let mut tables = entries
        .iter()
        .filter_map(|entry| entry.get("table"))
        .map(read_table);

    let mut current = tables
        .next()
        .ok_or_else(|| PlanShapeError::InvalidStructure("Empty nested_loop".into()))??;

    for table in tables {
        current = PlanNode::new(Operation::Join, "nested_loop")
            .with_child(current)
            .with_child(table?);
    }

    Ok(current)
}

fn read_table(table: &Value) -> Result<PlanNode, PlanShapeError> {
    let access_type = table
        .get("access_type")
        .and_then(Value::as_str)
        .unwrap_or("ALL");
    let covering = table
        .get("using_index")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let operation = match access_type_operation(access_type) {
        Operation::IndexScan if covering => Operation::IndexOnlyScan,
        operation => operation,
    };

    let mut node = PlanNode::new(operation, format!("table ({access_type})"));

    if let Some(name) = table.get("table_name").and_then(Value::as_str) {
        node.relation = Some(name.to_string());
    }
    if let Some(key) = table.get("key").and_then(Value::as_str) {
        node.index_name = Some(key.to_string());
    }
    node.rows = read_rows(table.get("rows_examined_per_scan"));

    if let Some(derived) = table
        .get("materialized_from_subquery")
        .and_then(|m| m.get("query_block"))
    {
        let subquery = PlanNode::new(Operation::Materialize, "materialized_from_subquery");
        node.children.push(subquery.with_child(read_query_block(derived)?));
    }

    if let Some(subqueries) = table.get("attached_subqueries").and_then(Value::as_array) {
        for block in subqueries.iter().filter_map(|s| s.get("query_block")) {
            let subquery = PlanNode::new(Operation::Subquery, "attached_subquery");
            node.children.push(subquery.with_child(read_query_block(block)?));
        }
    }

    Ok(node)
}

fn read_union(union: &Value) -> Result<PlanNode, PlanShapeError> {
    let mut node = PlanNode::new(Operation::SetOp, "union_result");

    if let Some(specs) = union.get("query_specifications").and_then(Value::as_array) {
        for block in specs.iter().filter_map(|s| s.get("query_block")) {
            node.children.push(read_query_block(block)?);
        }
    }

    Ok(node)
}

fn access_type_operation(access_type: &str) -> Operation {
    match access_type.to_ascii_lowercase().as_str() {
        "all" => Operation::FullScan,
        "index" | "range" | "ref" | "eq_ref" | "const" | "system" | "ref_or_null"
        | "fulltext" | "unique_subquery" | "index_subquery" | "index_merge" => {
            Operation::IndexScan
        }
        _ => Operation::Other,
    }
}
