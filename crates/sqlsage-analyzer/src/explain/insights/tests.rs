//! Tests for plan insights

use super::*;
use crate::explain::plan::PlanNode;
use pretty_assertions::assert_eq;
use serde_json::json;

fn scan(table: &str, rows: Option<u64>) -> PlanNode {
    let node = PlanNode::new(Operation::FullScan, "Seq Scan").with_relation(table);
    match rows {
        Some(rows) => node.with_rows(rows),
        None => node,
    }
}

fn tree(root: PlanNode) -> PlanTree {
    PlanTree::new(DatabaseType::PostgreSql, root)
}

fn messages(insights: &PlanInsights, category: InsightCategory) -> Vec<&str> {
    insights
        .get(category)
        .iter()
        .map(|i| i.message.as_str())
        .collect()
}

mod collection_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_categories_always_present() {
        let insights = PlanInsights::new();
        let categories: Vec<_> = insights.iter().map(|(c, _)| c.label()).collect();

        assert_eq!(
            categories,
            vec!["Major Concerns", "Optimization Opportunities", "Good Practices"]
        );
        assert!(insights.is_empty());
    }

    #[test]
    fn test_push_groups_by_category() {
        let mut insights = PlanInsights::new();
        insights.push(PlanInsight::success(InsightCategory::GoodPractices, "a"));
        insights.push(PlanInsight::warning(InsightCategory::MajorConcerns, "b"));
        insights.push(PlanInsight::success(InsightCategory::GoodPractices, "c"));

        assert_eq!(insights.len(), 3);
        assert_eq!(messages(&insights, InsightCategory::GoodPractices), vec!["a", "c"]);
        assert_eq!(messages(&insights, InsightCategory::MajorConcerns), vec!["b"]);
        assert!(insights.get(InsightCategory::OptimizationOpportunities).is_empty());
    }

    #[test]
    fn test_serializes_with_labels() {
        let mut insights = PlanInsights::new();
        insights.push(PlanInsight::info(
            InsightCategory::OptimizationOpportunities,
            "reorder",
        ));

        assert_eq!(
            serde_json::to_value(&insights).unwrap(),
            json!({
                "Major Concerns": [],
                "Optimization Opportunities": [
                    {"category": "Optimization Opportunities", "severity": "info", "message": "reorder"}
                ],
                "Good Practices": []
            })
        );
    }
}

mod placeholder_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_interpreter_uses_sample_rule() {
        let interpreter = PlanInterpreter::default();
        assert_eq!(interpreter.rule_names(), vec!["sample"]);
    }

    #[test]
    fn test_sample_insights_ignore_the_plan() {
        let interpreter = PlanInterpreter::default();
        let with_plan = interpreter.interpret(
            &json!([{"Plan": {"Node Type": "Index Scan", "Relation Name": "t"}}]),
            DatabaseType::PostgreSql,
        );
        let without_plan = interpreter.interpret(&json!(null), DatabaseType::MySql);

        assert_eq!(with_plan, without_plan);
        assert_eq!(
            with_plan.iter().map(|(_, items)| items.to_vec()).collect::<Vec<_>>(),
            vec![
                vec![PlanInsight::warning(
                    InsightCategory::MajorConcerns,
                    "Table scan detected. Consider adding indexes to improve performance."
                )],
                vec![PlanInsight::info(
                    InsightCategory::OptimizationOpportunities,
                    "Multiple join operations could be optimized by reordering joins."
                )],
                vec![PlanInsight::success(
                    InsightCategory::GoodPractices,
                    "Proper use of indexes for primary key lookups."
                )],
            ]
        );
    }
}

mod builtin_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn builtin() -> PlanInterpreter {
        PlanInterpreter::builtin(PlanThresholds::default())
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(
            builtin().rule_names(),
            vec!["full_scan", "join_order", "sort", "index_usage"]
        );
    }

    #[test]
    fn test_large_scan_is_major_concern() {
        let insights = builtin().evaluate(&tree(scan("users", Some(5_000))));

        let concerns = insights.get(InsightCategory::MajorConcerns);
        assert_eq!(concerns.len(), 1);
        assert_eq!(concerns[0].severity, InsightSeverity::Warning);
        assert!(concerns[0].message.contains("'users'"));
        assert!(concerns[0].message.contains("5000"));
    }

    #[test]
    fn test_small_scan_is_optimization_opportunity() {
        let insights = builtin().evaluate(&tree(scan("settings", Some(12))));

        assert!(insights.get(InsightCategory::MajorConcerns).is_empty());
        let opportunities = insights.get(InsightCategory::OptimizationOpportunities);
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].severity, InsightSeverity::Info);
    }

    #[test]
    fn test_scan_without_estimate_is_major_concern() {
        let insights = builtin().evaluate(&tree(scan("users", None)));
        assert_eq!(
            messages(&insights, InsightCategory::MajorConcerns),
            vec!["Table scan detected on 'users'. Consider adding indexes to improve performance."]
        );
    }

    #[test]
    fn test_thresholds_are_respected() {
        let interpreter = PlanInterpreter::builtin(PlanThresholds {
            large_table_threshold: 10,
            high_row_threshold: 100,
        });
        let insights = interpreter.evaluate(&tree(scan("settings", Some(12))));
        assert_eq!(insights.get(InsightCategory::MajorConcerns).len(), 1);
    }

    #[test]
    fn test_join_reordering() {
        let one_join = PlanNode::new(Operation::Join, "Hash Join")
            .with_child(scan("a", Some(1)))
            .with_child(scan("b", Some(1)));
        let insights = builtin().evaluate(&tree(one_join.clone()));
        assert!(
            !messages(&insights, InsightCategory::OptimizationOpportunities)
                .iter()
                .any(|m| m.contains("reordering"))
        );

        let two_joins = PlanNode::new(Operation::Join, "Nested Loop")
            .with_child(one_join)
            .with_child(scan("c", Some(1)));
        let insights = builtin().evaluate(&tree(two_joins));
        assert!(
            messages(&insights, InsightCategory::OptimizationOpportunities)
                .contains(&"Multiple join operations (2) could be optimized by reordering joins.")
        );
    }

    #[test]
    fn test_sort_reported_once() {
        let root = PlanNode::new(Operation::Sort, "Sort")
            .with_child(PlanNode::new(Operation::Sort, "Sort"));
        let insights = builtin().evaluate(&tree(root));

        assert_eq!(
            messages(&insights, InsightCategory::OptimizationOpportunities),
            vec!["Sort operation detected. An index matching the ORDER BY columns could avoid it."]
        );
    }

    #[test]
    fn test_index_usage_is_good_practice() {
        let root = PlanNode::new(Operation::IndexScan, "Index Scan")
            .with_relation("orders")
            .with_index("orders_pkey");
        let insights = builtin().evaluate(&tree(root));

        assert_eq!(
            insights.get(InsightCategory::GoodPractices),
            &[PlanInsight::success(
                InsightCategory::GoodPractices,
                "Index 'orders_pkey' is used to read 'orders'."
            )]
        );
        assert!(insights.get(InsightCategory::MajorConcerns).is_empty());
    }

    #[test]
    fn test_unreadable_plan_yields_no_insights() {
        let insights = builtin().interpret(&json!({"unexpected": true}), DatabaseType::PostgreSql);
        assert!(insights.is_empty());
        assert_eq!(insights.iter().count(), 3);
    }

    #[test]
    fn test_interprets_raw_sqlite_rows() {
        let plan = json!([
            {"id": 2, "parent": 0, "notused": 0, "detail": "SCAN users"},
            {"id": 3, "parent": 0, "notused": 0, "detail": "SEARCH orders USING INDEX idx_user (user_id=?)"}
        ]);
        let insights = builtin().interpret(&plan, DatabaseType::Sqlite);

        assert_eq!(insights.get(InsightCategory::MajorConcerns).len(), 1);
        assert_eq!(insights.get(InsightCategory::GoodPractices).len(), 1);
    }
}

mod config_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct AlwaysWarn;

    impl InsightRule for AlwaysWarn {
        fn name(&self) -> &'static str {
            "always_warn"
        }

        fn evaluate(&self, _plan: &PlanTree, _thresholds: &PlanThresholds, insights: &mut PlanInsights) {
            insights.push(PlanInsight::warning(InsightCategory::MajorConcerns, "custom"));
        }
    }

    #[test]
    fn test_from_config_selects_rule_set() {
        let placeholder = PlanInterpreter::from_config(&AdvisorConfig::default());
        assert_eq!(placeholder.rule_names(), vec!["sample"]);

        let builtin =
            PlanInterpreter::from_config(&AdvisorConfig::default().with_rule_set(RuleSet::Builtin));
        assert_eq!(builtin.rule_names().len(), 4);
    }

    #[test]
    fn test_custom_rule() {
        let interpreter = PlanInterpreter::new(PlanThresholds::default()).with_rule(AlwaysWarn);
        let insights = interpreter.evaluate(&PlanTree::empty(DatabaseType::Sqlite));
        assert_eq!(messages(&insights, InsightCategory::MajorConcerns), vec!["custom"]);
    }

    #[test]
    fn test_debug_lists_rules() {
        let debug = format!("{:?}", PlanInterpreter::default());
        assert!(debug.contains("sample"));
    }
}
