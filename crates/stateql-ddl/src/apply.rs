use std::time::Instant;

use serde::Serialize;
use stateql_core::{Error, Result, SchemaModel};
use tracing::{debug, info, warn};

use crate::compiler::compile;
use crate::executor::StatementExecutor;
use crate::options::CompileOptions;
use crate::statement::DdlStatement;

/// Statements that were executed by [`apply`], in order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    pub executed: Vec<DdlStatement>,
}

impl ApplyReport {
    pub fn tables(&self) -> Vec<&str> {
        self.executed
            .iter()
            .map(|statement| statement.table.as_str())
            .collect()
    }
}

/// Compile `model` and execute the statements one at a time.
///
/// Execution stops at the first statement the store rejects and the store's
/// message is returned unchanged. Tables created before the failure are left
/// in place; rerunning is safe because every statement uses `IF NOT EXISTS`.
///
/// Callers must not run two applies against the same store concurrently.
pub async fn apply<E>(
    model: &SchemaModel,
    executor: &E,
    options: &CompileOptions,
) -> Result<ApplyReport>
where
    E: StatementExecutor + ?Sized,
{
    let statements = compile(model, options)?;
    let timer = Instant::now();

    info!(
        event = "apply_started",
        engine = executor.engine(),
        statements = statements.len()
    );

    let mut report = ApplyReport::default();
    for statement in statements {
        if let Err(err) = executor.execute(&statement.sql).await {
            warn!(
                event = "statement_failed",
                table = %statement.table,
                executed = report.executed.len(),
                error = %err
            );
            return Err(Error::StatementExecution {
                table: statement.table,
                message: err.message,
            });
        }

        debug!(event = "statement_executed", table = %statement.table);
        report.executed.push(statement);
    }

    info!(
        event = "apply_finished",
        executed = report.executed.len(),
        duration_ms = timer.elapsed().as_millis()
    );

    Ok(report)
}
