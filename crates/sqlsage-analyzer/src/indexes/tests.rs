//! Tests for index recommendations

use super::*;
use crate::extract::JoinCondition;
use pretty_assertions::assert_eq;

fn facts(tables: &[&str]) -> QueryFacts {
    QueryFacts {
        tables: tables.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

mod where_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_table_equality() {
        let recs = generate_index_recommendations(&QueryFacts::extract(
            "SELECT * FROM orders WHERE customer_id = 5",
        ));

        assert_eq!(recs.len(), 1);
        assert_eq!(
            recs.get("orders", "idx_orders_customer_id"),
            Some(&IndexRecommendation {
                columns: vec!["customer_id".to_string()],
                reason: "Used in WHERE condition: customer_id = 5".to_string(),
                create_statement: "CREATE INDEX idx_orders_customer_id ON orders (customer_id);"
                    .to_string(),
            })
        );
    }

    #[test]
    fn test_comparison_operators() {
        let mut input = facts(&["t"]);
        input.where_conditions = strings(&["a >= 1", "b<>2", "c != 3", "d LIKE 'x%'", "e IN (1, 2)"]);
        let recs = generate_index_recommendations(&input);

        let names: Vec<_> = recs.iter().map(|(_, name, _)| name).collect();
        assert_eq!(names, vec!["idx_t_a", "idx_t_b", "idx_t_c", "idx_t_d", "idx_t_e"]);
    }

    #[test]
    fn test_lowercase_like_is_not_an_operator() {
        let mut input = facts(&["t"]);
        input.where_conditions = strings(&["name like 'x%'"]);
        assert!(generate_index_recommendations(&input).is_empty());
    }

    #[test]
    fn test_qualified_column_uses_column_part() {
        let mut input = facts(&["o"]);
        input.where_conditions = strings(&["o.total > 100"]);
        let recs = generate_index_recommendations(&input);
        assert!(recs.get("o", "idx_o_total").is_some());
    }

    #[test]
    fn test_condition_without_operator_is_skipped() {
        let mut input = facts(&["t"]);
        input.where_conditions = strings(&["EXISTS (SELECT 1)", "flag"]);
        let recs = generate_index_recommendations(&input);
        // `SELECT 1)` has no operator and `flag` is bare
        assert!(recs.is_empty());
    }

    #[test]
    fn test_every_table_gets_the_column() {
        let mut input = facts(&["users", "orders"]);
        input.where_conditions = strings(&["status = 'active'"]);
        let recs = generate_index_recommendations(&input);

        assert_eq!(recs.tables().collect::<Vec<_>>(), vec!["users", "orders"]);
        assert!(recs.get("users", "idx_users_status").is_some());
        assert!(recs.get("orders", "idx_orders_status").is_some());
    }

    #[test]
    fn test_no_tables_no_recommendations() {
        let mut input = facts(&[]);
        input.where_conditions = strings(&["a = 1"]);
        assert!(generate_index_recommendations(&input).is_empty());
    }
}

mod join_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_both_sides_are_recommended() {
        let mut input = facts(&[]);
        input.join_conditions = vec![JoinCondition::new("customers c", "o.customer_id = c.id")];
        let recs = generate_index_recommendations(&input);

        assert_eq!(recs.len(), 2);
        let o = recs.get("o", "idx_o_customer_id").unwrap();
        assert_eq!(o.reason, "Used in JOIN condition: o.customer_id = c.id");
        assert_eq!(o.create_statement, "CREATE INDEX idx_o_customer_id ON o (customer_id);");
        assert!(recs.get("c", "idx_c_id").is_some());
    }

    #[test]
    fn test_unqualified_join_predicate_is_skipped() {
        let mut input = facts(&["a", "b"]);
        input.join_conditions = vec![JoinCondition::new("b", "id = a_id")];
        assert!(generate_index_recommendations(&input).is_empty());
    }

    #[test]
    fn test_only_first_equality_is_used() {
        let mut input = facts(&[]);
        input.join_conditions = vec![JoinCondition::new(
            "b",
            "a.x = b.x AND a.y = b.y",
        )];
        let recs = generate_index_recommendations(&input);

        assert_eq!(recs.len(), 2);
        assert!(recs.get("a", "idx_a_x").is_some());
        assert!(recs.get("a", "idx_a_y").is_none());
    }
}

mod order_by_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_direction_suffix_is_stripped() {
        let mut input = facts(&["events"]);
        input.order_by_columns = strings(&["created_at DESC", "id asc", "name"]);
        let recs = generate_index_recommendations(&input);

        let names: Vec<_> = recs.iter().map(|(_, name, _)| name).collect();
        assert_eq!(
            names,
            vec!["idx_events_created_at", "idx_events_id", "idx_events_name"]
        );
        assert_eq!(
            recs.get("events", "idx_events_id").unwrap().reason,
            "Used in ORDER BY clause"
        );
    }
}

mod collision_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_reason_wins() {
        let recs = generate_index_recommendations(&QueryFacts::extract(
            "SELECT * FROM orders WHERE customer_id = 5 ORDER BY customer_id",
        ));

        assert_eq!(recs.len(), 1);
        assert_eq!(
            recs.get("orders", "idx_orders_customer_id").unwrap().reason,
            "Used in WHERE condition: customer_id = 5"
        );
    }

    #[test]
    fn test_duplicate_where_conditions() {
        let mut input = facts(&["t"]);
        input.where_conditions = strings(&["a = 1", "a > 0"]);
        let recs = generate_index_recommendations(&input);

        assert_eq!(recs.len(), 1);
        assert_eq!(
            recs.get("t", "idx_t_a").unwrap().reason,
            "Used in WHERE condition: a = 1"
        );
    }

    #[test]
    fn test_generation_is_idempotent() {
        let input = QueryFacts::extract(
            "SELECT o.id FROM orders o JOIN users u ON o.user_id = u.id WHERE u.active = 1 ORDER BY o.id DESC",
        );

        let first = generate_index_recommendations(&input);
        let second = generate_index_recommendations(&input);
        assert_eq!(first, second);
        assert_eq!(first.create_statements(), second.create_statements());
    }
}

mod collection_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty() {
        let recs = generate_index_recommendations(&QueryFacts::default());
        assert!(recs.is_empty());
        assert_eq!(recs.len(), 0);
        assert_eq!(recs.tables().count(), 0);
    }

    #[test]
    fn test_for_table() {
        let mut input = facts(&["t"]);
        input.where_conditions = strings(&["a = 1", "b = 2"]);
        let recs = generate_index_recommendations(&input);

        let table = recs.for_table("t").unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["idx_t_a", "idx_t_b"]);
        assert!(recs.for_table("missing").is_none());
    }

    #[test]
    fn test_serializes_as_nested_map() {
        let mut input = facts(&["t"]);
        input.where_conditions = strings(&["a = 1"]);
        let recs = generate_index_recommendations(&input);

        let json = serde_json::to_value(&recs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "t": {
                    "idx_t_a": {
                        "columns": ["a"],
                        "reason": "Used in WHERE condition: a = 1",
                        "create_statement": "CREATE INDEX idx_t_a ON t (a);"
                    }
                }
            })
        );
    }
}
