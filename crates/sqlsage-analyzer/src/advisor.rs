//! Query Advisor
//!
//! `QueryAdvisor` ties the analysis passes together behind one value that
//! owns the configuration. Every entry point takes the query (and, for
//! plans, the database tag) explicitly; the advisor keeps no per-query state.
//!
//! # Example
//!
//! ```
//! use sqlsage_analyzer::{AdvisorConfig, QueryAdvisor, QueryType};
//!
//! let advisor = QueryAdvisor::new(AdvisorConfig::default());
//! let analysis = advisor.analyze("SELECT id, total FROM orders WHERE customer_id = 7");
//!
//! assert_eq!(analysis.query_type, QueryType::Select);
//! assert_eq!(analysis.tables, vec!["orders"]);
//! assert_eq!(analysis.complexity.score, 0);
//!
//! let recommendations = advisor.recommend_indexes("SELECT * FROM orders WHERE customer_id = 123");
//! assert_eq!(
//!     recommendations.create_statements(),
//!     vec!["CREATE INDEX idx_orders_customer_id ON orders (customer_id);"]
//! );
//! ```

use crate::complexity::{ComplexityAssessment, assess_complexity};
use crate::config::AdvisorConfig;
use crate::explain::{ExecutionPlanReport, PlanError, PlanInterpreter, generate_execution_plan};
use crate::extract::{QueryFacts, extract_tables_and_columns};
use crate::indexes::{IndexRecommendations, generate_index_recommendations};
use crate::lexer::{QueryType, format_query, query_type};
use serde::Serialize;
use sqlsage_core::PlanExecutor;

/// Lexical and structural summary of one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAnalysis {
    pub query_type: QueryType,
    pub tables: Vec<String>,
    pub columns: Vec<String>,
    pub complexity: ComplexityAssessment,
    /// Pretty-printed query, absent when the input is blank
    pub formatted_query: Option<String>,
}

/// Entry point for analyzing queries, recommending indexes and reading plans
#[derive(Debug)]
pub struct QueryAdvisor {
    config: AdvisorConfig,
    interpreter: PlanInterpreter,
}

impl Default for QueryAdvisor {
    fn default() -> Self {
        Self::new(AdvisorConfig::default())
    }
}

impl QueryAdvisor {
    /// Creates an advisor; the plan interpreter follows `config.rule_set`
    pub fn new(config: AdvisorConfig) -> Self {
        let interpreter = PlanInterpreter::from_config(&config);
        Self {
            config,
            interpreter,
        }
    }

    /// Replaces the plan interpreter, e.g. one carrying custom rules
    pub fn with_interpreter(mut self, interpreter: PlanInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn interpreter(&self) -> &PlanInterpreter {
        &self.interpreter
    }

    /// Classifies the query, extracts its tables and columns, scores its
    /// complexity and pretty-prints it
    #[tracing::instrument(skip(self, query), fields(sql_preview = %query.chars().take(100).collect::<String>()))]
    pub fn analyze(&self, query: &str) -> QueryAnalysis {
        let (tables, columns) = extract_tables_and_columns(query);
        let complexity = assess_complexity(query);

        let formatted_query = match format_query(query, &self.config.formatter) {
            Ok(formatted) => Some(formatted),
            Err(e) => {
                tracing::debug!(error = %e, "skipping query formatting");
                None
            }
        };

        let analysis = QueryAnalysis {
            query_type: query_type(query),
            tables,
            columns,
            complexity,
            formatted_query,
        };

        tracing::debug!(
            query_type = analysis.query_type.as_str(),
            tables = analysis.tables.len(),
            score = analysis.complexity.score,
            "query analyzed"
        );
        analysis
    }

    /// Suggests indexes for the WHERE, JOIN and ORDER BY clauses of the query
    #[tracing::instrument(skip(self, query), fields(sql_preview = %query.chars().take(100).collect::<String>()))]
    pub fn recommend_indexes(&self, query: &str) -> IndexRecommendations {
        generate_index_recommendations(&QueryFacts::extract(query))
    }

    /// Runs EXPLAIN for the query through `executor` and interprets the plan
    pub async fn explain(
        &self,
        executor: &dyn PlanExecutor,
        database_tag: &str,
        query: &str,
    ) -> Result<ExecutionPlanReport, PlanError> {
        generate_execution_plan(executor, database_tag, query, &self.interpreter).await
    }
}
