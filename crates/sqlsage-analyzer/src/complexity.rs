//! Query Complexity Assessment
//!
//! Scores a query from 0 to 10 against a fixed catalog of eight factors.
//! Each factor contributes independently (some with a cap), the sum is
//! clamped to 10, and every factor reports whether it was found along
//! with a static explanation.
//!
//! # Example
//!
//! ```
//! use sqlsage_analyzer::complexity::{assess_complexity, ComplexityFactor};
//!
//! let assessment = assess_complexity("SELECT DISTINCT city FROM users");
//! assert_eq!(assessment.score, 1);
//! assert!(assessment.is_found(ComplexityFactor::DistinctOperator));
//! ```

use crate::extract::extract_where_conditions;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Maximum complexity score
pub const MAX_COMPLEXITY_SCORE: u8 = 10;

const AGGREGATE_CALLS: [&str; 5] = ["sum(", "avg(", "count(", "max(", "min("];

static JOIN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bjoin\b").expect("valid regex"));

static WINDOW_FUNCTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bover\s*\(").expect("valid regex"));

static DISTINCT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdistinct\b").expect("valid regex"));

/// A named heuristic signal in the complexity catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplexityFactor {
    #[serde(rename = "Nested Subqueries")]
    NestedSubqueries,
    #[serde(rename = "Multiple Joins")]
    MultipleJoins,
    #[serde(rename = "Complex Aggregations")]
    ComplexAggregations,
    #[serde(rename = "Window Functions")]
    WindowFunctions,
    #[serde(rename = "Complex Filtering")]
    ComplexFiltering,
    /// Catalog entry only; never scored
    #[serde(rename = "ORDER BY without INDEX")]
    OrderByWithoutIndex,
    #[serde(rename = "DISTINCT Operator")]
    DistinctOperator,
    /// Catalog entry only; never scored
    #[serde(rename = "Large Table Operations")]
    LargeTableOperations,
}

impl ComplexityFactor {
    /// The catalog, in reporting order
    pub const ALL: [ComplexityFactor; 8] = [
        Self::NestedSubqueries,
        Self::MultipleJoins,
        Self::ComplexAggregations,
        Self::WindowFunctions,
        Self::ComplexFiltering,
        Self::OrderByWithoutIndex,
        Self::DistinctOperator,
        Self::LargeTableOperations,
    ];

    /// Display name of the factor
    pub fn name(&self) -> &'static str {
        match self {
            Self::NestedSubqueries => "Nested Subqueries",
            Self::MultipleJoins => "Multiple Joins",
            Self::ComplexAggregations => "Complex Aggregations",
            Self::WindowFunctions => "Window Functions",
            Self::ComplexFiltering => "Complex Filtering",
            Self::OrderByWithoutIndex => "ORDER BY without INDEX",
            Self::DistinctOperator => "DISTINCT Operator",
            Self::LargeTableOperations => "Large Table Operations",
        }
    }

    /// Static explanation shown when the factor is found
    pub fn explanation(&self) -> &'static str {
        match self {
            Self::NestedSubqueries => "Nested subqueries can significantly impact performance",
            Self::MultipleJoins => "Queries with multiple joins may require optimization",
            Self::ComplexAggregations => {
                "Aggregations like COUNT, SUM, AVG may require optimization"
            }
            Self::WindowFunctions => "Window functions can be resource-intensive",
            Self::ComplexFiltering => "Many WHERE conditions or complex predicates",
            Self::OrderByWithoutIndex => "Sorting without proper indexes can be slow",
            Self::DistinctOperator => "DISTINCT requires additional processing",
            Self::LargeTableOperations => "Operations on large tables may require optimization",
        }
    }
}

/// Per-query status of one factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorStatus {
    pub found: bool,
    pub explanation: &'static str,
}

/// Score and factor breakdown for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityAssessment {
    /// Score in `0..=10`
    pub score: u8,
    /// Every catalog factor, in catalog order
    pub factors: IndexMap<ComplexityFactor, FactorStatus>,
}

impl ComplexityAssessment {
    fn empty() -> Self {
        let factors = ComplexityFactor::ALL
            .iter()
            .map(|factor| {
                (
                    *factor,
                    FactorStatus {
                        found: false,
                        explanation: factor.explanation(),
                    },
                )
            })
            .collect();

        Self { score: 0, factors }
    }

    fn trigger(&mut self, factor: ComplexityFactor, points: usize) {
        if let Some(status) = self.factors.get_mut(&factor) {
            status.found = true;
        }
        let points = u8::try_from(points).unwrap_or(u8::MAX);
        self.score = self.score.saturating_add(points);
    }

    /// Returns true if the factor was found in the query
    pub fn is_found(&self, factor: ComplexityFactor) -> bool {
        self.factors.get(&factor).is_some_and(|status| status.found)
    }

    /// Returns the factors that were found, in catalog order
    pub fn triggered(&self) -> impl Iterator<Item = (ComplexityFactor, &FactorStatus)> + '_ {
        self.factors
            .iter()
            .filter(|(_, status)| status.found)
            .map(|(factor, status)| (*factor, status))
    }
}

/// Scores a query against the complexity catalog
///
/// | Factor | Trigger | Points |
/// |---|---|---|
/// | Nested Subqueries | more than one `select` substring | 2 |
/// | Multiple Joins | more than one `join` word | join count, max 3 |
/// | Complex Aggregations | any `sum(`, `avg(`, `count(`, `max(`, `min(` | call count, max 2 |
/// | Window Functions | `OVER (` | 2 |
/// | Complex Filtering | more than two WHERE conditions | conditions - 2, max 2 |
/// | DISTINCT Operator | `DISTINCT` word | 1 |
///
/// Matching is case-insensitive. The total is clamped to 10.
pub fn assess_complexity(query: &str) -> ComplexityAssessment {
    let mut assessment = ComplexityAssessment::empty();
    let lowered = query.to_lowercase();

    if lowered.matches("select").count() > 1 {
        assessment.trigger(ComplexityFactor::NestedSubqueries, 2);
    }

    let join_count = JOIN_REGEX.find_iter(query).count();
    if join_count > 1 {
        assessment.trigger(ComplexityFactor::MultipleJoins, join_count.min(3));
    }

    let aggregation_count: usize = AGGREGATE_CALLS
        .iter()
        .map(|call| lowered.matches(*call).count())
        .sum();
    if aggregation_count > 0 {
        assessment.trigger(ComplexityFactor::ComplexAggregations, aggregation_count.min(2));
    }

    if WINDOW_FUNCTION_REGEX.is_match(query) {
        assessment.trigger(ComplexityFactor::WindowFunctions, 2);
    }

    let condition_count = extract_where_conditions(query).len();
    if condition_count > 2 {
        assessment.trigger(ComplexityFactor::ComplexFiltering, (condition_count - 2).min(2));
    }

    if DISTINCT_REGEX.is_match(query) {
        assessment.trigger(ComplexityFactor::DistinctOperator, 1);
    }

    assessment.score = assessment.score.min(MAX_COMPLEXITY_SCORE);
    tracing::trace!(score = assessment.score, "assessed query complexity");
    assessment
}
