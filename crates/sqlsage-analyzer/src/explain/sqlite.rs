//! SQLite plan normalization
//!
//! `EXPLAIN QUERY PLAN` returns rows of `(id, parent, notused, detail)`.
//! Rows whose `parent` names another row's `id` become that row's children;
//! everything else is a root. Executors may also return the rows as bare
//! detail strings, or the whole plan as the text the sqlite3 shell prints:
//!
//! ```text
//! QUERY PLAN
//! |--SCAN users
//! `--SEARCH orders USING INDEX idx_user_id (user_id=?)
//! ```

use super::plan::{Operation, PlanNode, PlanShapeError, PlanTree};
use regex::Regex;
use serde_json::Value;
use sqlsage_core::DatabaseType;
use std::collections::HashSet;
use std::sync::LazyLock;

// `SCAN users`, `SEARCH TABLE orders AS o USING ...`
static TABLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:SCAN|SEARCH)\s+(?:TABLE\s+)?(\S+)").expect("valid regex")
});

static INDEX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)USING\s+(?:COVERING\s+)?INDEX\s+([^\s(]+)").expect("valid regex")
});

const TREE_HEADER: &str = "QUERY PLAN";

struct PlanRow {
    id: i64,
    parent: i64,
    node: PlanNode,
}

pub(crate) fn normalize(value: &Value) -> Result<PlanTree, PlanShapeError> {
    let roots = match value {
        Value::Array(rows) => read_plan_rows(rows)?,
        Value::String(text) => read_tree_text(text),
        Value::Object(_) => read_plan_rows(std::slice::from_ref(value))?,
        _ => {
            return Err(PlanShapeError::InvalidStructure(
                "expected query plan rows".into(),
            ));
        }
    };

    Ok(PlanTree {
        database: DatabaseType::Sqlite,
        roots,
    })
}

fn read_plan_rows(rows: &[Value]) -> Result<Vec<PlanNode>, PlanShapeError> {
    let mut plan_rows = Vec::with_capacity(rows.len());

    for (position, row) in rows.iter().enumerate() {
        let plan_row = match row {
            Value::String(detail) => PlanRow {
                id: position as i64 + 1,
                parent: 0,
                node: parse_detail(detail),
            },
            Value::Object(_) => {
                let detail = row
                    .get("detail")
                    .and_then(Value::as_str)
                    .ok_or(PlanShapeError::Missing("detail column"))?;
                PlanRow {
                    id: row
                        .get("id")
                        .and_then(Value::as_i64)
                        .unwrap_or(position as i64 + 1),
                    parent: row.get("parent").and_then(Value::as_i64).unwrap_or(0),
                    node: parse_detail(detail),
                }
            }
            _ => {
                return Err(PlanShapeError::InvalidStructure(format!(
                    "unexpected query plan row: {row}"
                )));
            }
        };
        plan_rows.push(plan_row);
    }

    Ok(assemble(plan_rows))
}

/// Builds the tree from `(id, parent)` links
fn assemble(rows: Vec<PlanRow>) -> Vec<PlanNode> {
    let ids: HashSet<i64> = rows.iter().map(|row| row.id).collect();
    let mut slots: Vec<Option<PlanRow>> = rows.into_iter().map(Some).collect();
    let mut visited = HashSet::new();

    let root_indexes: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| {
            let row = slot.as_ref()?;
            (row.parent == row.id || !ids.contains(&row.parent)).then_some(index)
        })
        .collect();

    root_indexes
        .into_iter()
        .filter_map(|index| take_subtree(&mut slots, index, &mut visited))
        .collect()
}

fn take_subtree(
    slots: &mut [Option<PlanRow>],
    index: usize,
    visited: &mut HashSet<i64>,
) -> Option<PlanNode> {
    let row = slots.get_mut(index)?.take()?;
    if !visited.insert(row.id) {
        return None;
    }

    let child_indexes: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| {
            let child = slot.as_ref()?;
            (child.parent == row.id && child.id != row.id).then_some(i)
        })
        .collect();

    let mut node = row.node;
    for child_index in child_indexes {
        if let Some(child) = take_subtree(slots, child_index, visited) {
            node.children.push(child);
        }
    }

    Some(node)
}

/// Reads the indented tree printed by the sqlite3 shell
fn read_tree_text(text: &str) -> Vec<PlanNode> {
    let mut roots: Vec<PlanNode> = Vec::new();
    let mut stack: Vec<(usize, PlanNode)> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() || line.trim() == TREE_HEADER {
            continue;
        }

        let detail = line.trim_start_matches([' ', '|', '`', '-']);
        let prefix_len = line.len() - detail.len();
        let depth = (prefix_len / 3).saturating_sub(1);

        while stack.last().is_some_and(|(d, _)| *d >= depth) {
            attach(&mut stack, &mut roots);
        }
        stack.push((depth, parse_detail(detail)));
    }

    while !stack.is_empty() {
        attach(&mut stack, &mut roots);
    }

    roots
}

fn attach(stack: &mut Vec<(usize, PlanNode)>, roots: &mut Vec<PlanNode>) {
    let Some((_, node)) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some((_, parent)) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Classifies one `detail` string
fn parse_detail(detail: &str) -> PlanNode {
    let detail = detail.trim();
    let upper = detail.to_uppercase();

    let operation = if upper.starts_with("SCAN") {
        if upper.contains("COVERING INDEX") {
            Operation::IndexOnlyScan
        } else if upper.contains("USING INDEX") {
            Operation::IndexScan
        } else if upper.contains("SUBQUERY") {
            Operation::Subquery
        } else if upper.contains("CONSTANT ROW") {
            Operation::Other
        } else {
            Operation::FullScan
        }
    } else if upper.starts_with("SEARCH") {
        if upper.contains("COVERING INDEX") {
            Operation::IndexOnlyScan
        } else {
            Operation::IndexScan
        }
    } else if upper.starts_with("USE TEMP B-TREE") {
        if upper.contains("ORDER BY") {
            Operation::Sort
        } else if upper.contains("DISTINCT") {
            Operation::Distinct
        } else if upper.contains("GROUP BY") {
            Operation::Aggregate
        } else {
            Operation::Other
        }
    } else if upper.starts_with("CORRELATED")
        || upper.starts_with("SCALAR SUBQUERY")
        || upper.starts_with("LIST SUBQUERY")
    {
        Operation::Subquery
    } else if upper.starts_with("CO-ROUTINE") || upper.starts_with("MATERIALIZE") {
        Operation::Materialize
    } else if upper.starts_with("COMPOUND")
        || upper.starts_with("UNION")
        || upper.starts_with("MERGE")
        || upper.starts_with("LEFT-MOST SUBQUERY")
    {
        Operation::SetOp
    } else if upper.starts_with("RIGHT-JOIN") || upper.starts_with("LEFT") {
        Operation::Join
    } else {
        Operation::Other
    };

    let mut node = PlanNode::new(operation, detail);

    if matches!(
        operation,
        Operation::FullScan | Operation::IndexScan | Operation::IndexOnlyScan
    ) {
        node.relation = TABLE_REGEX
            .captures(detail)
            .map(|caps| caps[1].to_string());
    }

    if let Some(caps) = INDEX_REGEX.captures(detail) {
        node.index_name = Some(caps[1].to_string());
    } else if upper.contains("INTEGER PRIMARY KEY") {
        node.index_name = Some("PRIMARY KEY".to_string());
    }

    node
}
