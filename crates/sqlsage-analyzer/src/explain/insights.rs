//! Execution Plan Insights
//!
//! The interpreter runs a list of `InsightRule`s over a normalized plan and
//! collects their findings into three fixed categories.
//!
//! Two rule sets ship with the crate:
//! - `RuleSet::Placeholder` (default) runs `SampleInsightRule`, which reports
//!   the same three sample insights for every plan. Plan analysis proper has
//!   not been settled, so this keeps the seam visible instead of guessing.
//! - `RuleSet::Builtin` runs rules that inspect the plan tree: full scans,
//!   join count, sorts and index usage.
//!
//! Callers can supply their own rules through `PlanInterpreter::with_rule`.

use super::plan::{Operation, PlanTree, normalize_plan};
use crate::config::{AdvisorConfig, PlanThresholds, RuleSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlsage_core::DatabaseType;
use std::fmt;

/// Grouping used when reporting insights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightCategory {
    #[serde(rename = "Major Concerns")]
    MajorConcerns,
    #[serde(rename = "Optimization Opportunities")]
    OptimizationOpportunities,
    #[serde(rename = "Good Practices")]
    GoodPractices,
}

impl InsightCategory {
    /// All categories, in reporting order
    pub const ALL: [InsightCategory; 3] = [
        Self::MajorConcerns,
        Self::OptimizationOpportunities,
        Self::GoodPractices,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MajorConcerns => "Major Concerns",
            Self::OptimizationOpportunities => "Optimization Opportunities",
            Self::GoodPractices => "Good Practices",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How an insight should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSeverity {
    Warning,
    Info,
    Success,
}

/// A single finding about an execution plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanInsight {
    pub category: InsightCategory,
    pub severity: InsightSeverity,
    pub message: String,
}

impl PlanInsight {
    pub fn new(
        category: InsightCategory,
        severity: InsightSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
        }
    }

    pub fn warning(category: InsightCategory, message: impl Into<String>) -> Self {
        Self::new(category, InsightSeverity::Warning, message)
    }

    pub fn info(category: InsightCategory, message: impl Into<String>) -> Self {
        Self::new(category, InsightSeverity::Info, message)
    }

    pub fn success(category: InsightCategory, message: impl Into<String>) -> Self {
        Self::new(category, InsightSeverity::Success, message)
    }
}

/// Insights grouped by category
///
/// Every category is always present, in `InsightCategory::ALL` order, even
/// when it holds no insights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlanInsights(IndexMap<InsightCategory, Vec<PlanInsight>>);

impl Default for PlanInsights {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanInsights {
    pub fn new() -> Self {
        Self(
            InsightCategory::ALL
                .iter()
                .map(|category| (*category, Vec::new()))
                .collect(),
        )
    }

    /// Adds an insight under its own category
    pub fn push(&mut self, insight: PlanInsight) {
        self.0.entry(insight.category).or_default().push(insight);
    }

    /// Insights recorded for `category`
    pub fn get(&self, category: InsightCategory) -> &[PlanInsight] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterate over categories and their insights in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (InsightCategory, &[PlanInsight])> + '_ {
        self.0
            .iter()
            .map(|(category, insights)| (*category, insights.as_slice()))
    }

    /// Total number of insights
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A detection rule applied to a normalized plan
pub trait InsightRule: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Inspect `plan` and record any findings
    fn evaluate(&self, plan: &PlanTree, thresholds: &PlanThresholds, insights: &mut PlanInsights);
}

/// Reports three fixed sample insights regardless of the plan
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleInsightRule;

impl InsightRule for SampleInsightRule {
    fn name(&self) -> &'static str {
        "sample"
    }

    fn evaluate(&self, _plan: &PlanTree, _thresholds: &PlanThresholds, insights: &mut PlanInsights) {
        insights.push(PlanInsight::warning(
            InsightCategory::MajorConcerns,
            "Table scan detected. Consider adding indexes to improve performance.",
        ));
        insights.push(PlanInsight::info(
            InsightCategory::OptimizationOpportunities,
            "Multiple join operations could be optimized by reordering joins.",
        ));
        insights.push(PlanInsight::success(
            InsightCategory::GoodPractices,
            "Proper use of indexes for primary key lookups.",
        ));
    }
}

/// Flags full table scans
///
/// Scans at or above `large_table_threshold` rows, or with no row estimate,
/// are major concerns. Smaller scans are optimization opportunities.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullScanRule;

impl InsightRule for FullScanRule {
    fn name(&self) -> &'static str {
        "full_scan"
    }

    fn evaluate(&self, plan: &PlanTree, thresholds: &PlanThresholds, insights: &mut PlanInsights) {
        for node in plan
            .iter_nodes()
            .filter(|n| n.operation == Operation::FullScan)
        {
            let table = node.relation.as_deref().unwrap_or("unknown");

            let insight = match node.rows {
                None => PlanInsight::warning(
                    InsightCategory::MajorConcerns,
                    format!(
                        "Table scan detected on '{table}'. Consider adding indexes to improve performance."
                    ),
                ),
                Some(rows) if rows >= thresholds.high_row_threshold => PlanInsight::warning(
                    InsightCategory::MajorConcerns,
                    format!(
                        "Table scan on '{table}' reads about {rows} rows. Add an index on the filtered columns or narrow the query."
                    ),
                ),
                Some(rows) if rows >= thresholds.large_table_threshold => PlanInsight::warning(
                    InsightCategory::MajorConcerns,
                    format!(
                        "Table scan on '{table}' reads about {rows} rows. Consider adding indexes to improve performance."
                    ),
                ),
                Some(rows) => PlanInsight::info(
                    InsightCategory::OptimizationOpportunities,
                    format!(
                        "Table scan on '{table}' reads about {rows} rows. An index may help as the table grows."
                    ),
                ),
            };
            insights.push(insight);
        }
    }
}

/// Suggests join reordering when a plan joins three or more inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinOrderRule;

impl InsightRule for JoinOrderRule {
    fn name(&self) -> &'static str {
        "join_order"
    }

    fn evaluate(&self, plan: &PlanTree, _thresholds: &PlanThresholds, insights: &mut PlanInsights) {
        let joins = plan.count(Operation::Join);
        if joins >= 2 {
            insights.push(PlanInsight::info(
                InsightCategory::OptimizationOpportunities,
                format!(
                    "Multiple join operations ({joins}) could be optimized by reordering joins."
                ),
            ));
        }
    }
}

/// Points out explicit sort steps
#[derive(Debug, Clone, Copy, Default)]
pub struct SortRule;

impl InsightRule for SortRule {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn evaluate(&self, plan: &PlanTree, _thresholds: &PlanThresholds, insights: &mut PlanInsights) {
        if plan.contains(Operation::Sort) {
            insights.push(PlanInsight::info(
                InsightCategory::OptimizationOpportunities,
                "Sort operation detected. An index matching the ORDER BY columns could avoid it.",
            ));
        }
    }
}

/// Credits reads that go through an index
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexUsageRule;

impl InsightRule for IndexUsageRule {
    fn name(&self) -> &'static str {
        "index_usage"
    }

    fn evaluate(&self, plan: &PlanTree, _thresholds: &PlanThresholds, insights: &mut PlanInsights) {
        for node in plan.iter_nodes().filter(|n| n.operation.uses_index()) {
            let table = node.relation.as_deref().unwrap_or("unknown");
            let message = match &node.index_name {
                Some(index) => format!("Index '{index}' is used to read '{table}'."),
                None => format!("An index is used to read '{table}'."),
            };
            insights.push(PlanInsight::success(InsightCategory::GoodPractices, message));
        }
    }
}

/// Applies insight rules to execution plans
pub struct PlanInterpreter {
    rules: Vec<Box<dyn InsightRule>>,
    thresholds: PlanThresholds,
}

impl Default for PlanInterpreter {
    fn default() -> Self {
        Self::placeholder(PlanThresholds::default())
    }
}

impl fmt::Debug for PlanInterpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanInterpreter")
            .field("rules", &self.rule_names())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

impl PlanInterpreter {
    /// An interpreter with no rules
    pub fn new(thresholds: PlanThresholds) -> Self {
        Self {
            rules: Vec::new(),
            thresholds,
        }
    }

    /// An interpreter running only `SampleInsightRule`
    pub fn placeholder(thresholds: PlanThresholds) -> Self {
        Self::new(thresholds).with_rule(SampleInsightRule)
    }

    /// An interpreter running the rules that inspect the plan
    pub fn builtin(thresholds: PlanThresholds) -> Self {
        Self::new(thresholds)
            .with_rule(FullScanRule)
            .with_rule(JoinOrderRule)
            .with_rule(SortRule)
            .with_rule(IndexUsageRule)
    }

    /// Builds the interpreter selected by `config.rule_set`
    pub fn from_config(config: &AdvisorConfig) -> Self {
        match config.rule_set {
            RuleSet::Placeholder => Self::placeholder(config.plan),
            RuleSet::Builtin => Self::builtin(config.plan),
        }
    }

    /// Adds a rule; rules run in the order they were added
    pub fn with_rule(mut self, rule: impl InsightRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn thresholds(&self) -> &PlanThresholds {
        &self.thresholds
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Normalizes a raw plan and runs every rule over it
    ///
    /// A plan that cannot be normalized is logged and treated as empty, so
    /// interpretation itself never fails.
    pub fn interpret(&self, plan: &Value, database: DatabaseType) -> PlanInsights {
        let tree = match normalize_plan(plan, database) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::debug!(%database, error = %e, "could not normalize plan, evaluating empty tree");
                PlanTree::empty(database)
            }
        };
        self.evaluate(&tree)
    }

    /// Runs every rule over an already normalized plan
    pub fn evaluate(&self, tree: &PlanTree) -> PlanInsights {
        let mut insights = PlanInsights::new();
        for rule in &self.rules {
            rule.evaluate(tree, &self.thresholds, &mut insights);
        }

        tracing::debug!(
            database = %tree.database,
            nodes = tree.node_count(),
            insights = insights.len(),
            "interpreted execution plan"
        );
        insights
    }
}

#[cfg(test)]
mod tests;
