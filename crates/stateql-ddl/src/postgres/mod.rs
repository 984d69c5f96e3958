use async_trait::async_trait;
use sqlx::PgPool;

use stateql_core::{Result, SchemaModel};

use crate::apply::{ApplyReport, apply};
use crate::executor::{ExecutionError, StatementExecutor};
use crate::options::CompileOptions;

/// Executor for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresExecutor {
    pool: PgPool,
}

impl PostgresExecutor {
    /// Create a new executor using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatementExecutor for PostgresExecutor {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn execute(&self, sql: &str) -> std::result::Result<(), ExecutionError> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(execution_error)
    }
}

/// Keep the server's own message for database errors.
fn execution_error(err: sqlx::Error) -> ExecutionError {
    match err.as_database_error() {
        Some(db_err) => ExecutionError::new(db_err.message()),
        None => ExecutionError::new(err.to_string()),
    }
}

/// Apply a model to Postgres with default options.
pub async fn apply_postgres(pool: &PgPool, model: &SchemaModel) -> Result<ApplyReport> {
    apply_postgres_with_options(pool, model, CompileOptions::default()).await
}

/// Apply a model to Postgres with caller-provided options.
pub async fn apply_postgres_with_options(
    pool: &PgPool,
    model: &SchemaModel,
    options: CompileOptions,
) -> Result<ApplyReport> {
    let executor = PostgresExecutor::new(pool.clone());
    apply(model, &executor, &options).await
}
