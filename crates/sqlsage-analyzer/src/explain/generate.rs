//! Execution plan generation

use super::command::{PlanError, explain_command, resolve_database};
use super::insights::{PlanInsights, PlanInterpreter};
use serde::Serialize;
use serde_json::Value;
use sqlsage_core::{DatabaseType, PlanExecutor, SqlsageError};

/// The plan produced for one query, with its insights
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionPlanReport {
    /// The EXPLAIN statement that was executed
    pub statement: String,
    pub database: DatabaseType,
    /// The plan exactly as the executor returned it
    pub plan: Value,
    pub insights: PlanInsights,
}

/// Builds the EXPLAIN statement for `database_tag`, runs it once through
/// `executor`, and interprets the returned plan
///
/// Fails with `PlanError::UnsupportedDatabase` before contacting the
/// executor when the tag is not recognized. Executor failures are returned
/// unchanged inside `PlanError::Execution`; an empty (`null`) plan is an
/// execution failure too.
#[tracing::instrument(skip(executor, query, interpreter), fields(sql_preview = %query.chars().take(100).collect::<String>()))]
pub async fn generate_execution_plan(
    executor: &dyn PlanExecutor,
    database_tag: &str,
    query: &str,
    interpreter: &PlanInterpreter,
) -> Result<ExecutionPlanReport, PlanError> {
    let database = resolve_database(database_tag).inspect_err(|_| {
        tracing::debug!("no EXPLAIN syntax for database tag");
    })?;

    let statement = explain_command(database, query);
    tracing::debug!(%database, "executing EXPLAIN statement");

    let plan = match executor.execute(&statement).await {
        Ok(Value::Null) => {
            tracing::error!(%database, "EXPLAIN statement returned no plan");
            return Err(PlanError::Execution(SqlsageError::Execution(
                "Failed to generate execution plan".to_string(),
            )));
        }
        Ok(plan) => plan,
        Err(e) => {
            tracing::error!(%database, error = %e, "EXPLAIN statement failed");
            return Err(PlanError::Execution(e));
        }
    };

    let insights = interpreter.interpret(&plan, database);
    tracing::info!(%database, insights = insights.len(), "execution plan generated");

    Ok(ExecutionPlanReport {
        statement,
        database,
        plan,
        insights,
    })
}
