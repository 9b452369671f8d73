//! Tests for the normalized plan model

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn sample_tree() -> PlanTree {
    // Build a tree:
    //          Join
    //         /    \
    //   FullScan   Join
    //             /    \
    //       IndexScan  IndexOnlyScan
    let inner = PlanNode::new(Operation::Join, "Nested Loop")
        .with_child(
            PlanNode::new(Operation::IndexScan, "Index Scan")
                .with_relation("orders")
                .with_index("orders_user_id_idx"),
        )
        .with_child(PlanNode::new(Operation::IndexOnlyScan, "Index Only Scan").with_relation("items"));

    let root = PlanNode::new(Operation::Join, "Hash Join")
        .with_child(PlanNode::new(Operation::FullScan, "Seq Scan").with_relation("users").with_rows(5000))
        .with_child(inner);

    PlanTree::new(DatabaseType::PostgreSql, root)
}

mod tree_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_depth_first_order() {
        let tree = sample_tree();
        let labels: Vec<_> = tree.iter_nodes().map(|n| n.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Hash Join", "Seq Scan", "Nested Loop", "Index Scan", "Index Only Scan"]
        );
    }

    #[test]
    fn test_multiple_roots_are_visited_in_order() {
        let tree = PlanTree {
            database: DatabaseType::Sqlite,
            roots: vec![
                PlanNode::new(Operation::FullScan, "SCAN a")
                    .with_child(PlanNode::new(Operation::Subquery, "CORRELATED SCALAR SUBQUERY 1")),
                PlanNode::new(Operation::Sort, "USE TEMP B-TREE FOR ORDER BY"),
            ],
        };

        let labels: Vec<_> = tree.iter_nodes().map(|n| n.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["SCAN a", "CORRELATED SCALAR SUBQUERY 1", "USE TEMP B-TREE FOR ORDER BY"]
        );
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_count_and_contains() {
        let tree = sample_tree();
        assert_eq!(tree.count(Operation::Join), 2);
        assert_eq!(tree.count(Operation::FullScan), 1);
        assert!(tree.contains(Operation::IndexOnlyScan));
        assert!(!tree.contains(Operation::Sort));
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_empty_tree() {
        let tree = PlanTree::empty(DatabaseType::MySql);
        assert!(tree.is_empty());
        assert_eq!(tree.iter_nodes().count(), 0);
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn test_uses_index() {
        assert!(Operation::IndexScan.uses_index());
        assert!(Operation::IndexOnlyScan.uses_index());
        assert!(!Operation::FullScan.uses_index());
    }
}

mod helper_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_rows_accepts_numbers_and_strings() {
        assert_eq!(read_rows(Some(&json!(42))), Some(42));
        assert_eq!(read_rows(Some(&json!(41.6))), Some(42));
        assert_eq!(read_rows(Some(&json!("17"))), Some(17));
        assert_eq!(read_rows(Some(&json!(-3))), None);
        assert_eq!(read_rows(Some(&json!("many"))), None);
        assert_eq!(read_rows(None), None);
    }

    #[test]
    fn test_decode_embedded() {
        let decoded = decode_embedded(&json!(r#"{"a": 1}"#)).unwrap();
        assert_eq!(decoded, Some(json!({"a": 1})));

        assert_eq!(decode_embedded(&json!({"a": 1})).unwrap(), None);
        assert!(decode_embedded(&json!("not json")).is_err());
    }
}

mod normalize_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dispatches_by_database() {
        let pg = normalize_plan(
            &json!([{"Plan": {"Node Type": "Seq Scan", "Relation Name": "users"}}]),
            DatabaseType::PostgreSql,
        )
        .unwrap();
        assert_eq!(pg.database, DatabaseType::PostgreSql);
        assert!(pg.contains(Operation::FullScan));

        let sqlite = normalize_plan(&json!(["SCAN users"]), DatabaseType::Sqlite).unwrap();
        assert_eq!(sqlite.database, DatabaseType::Sqlite);
        assert!(sqlite.contains(Operation::FullScan));
    }

    #[test]
    fn test_wrong_shape_for_database() {
        let sqlite_rows = json!([{"id": 2, "parent": 0, "notused": 0, "detail": "SCAN users"}]);
        assert!(normalize_plan(&sqlite_rows, DatabaseType::PostgreSql).is_err());
        assert!(normalize_plan(&sqlite_rows, DatabaseType::MySql).is_err());
    }
}
