use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a store while executing one statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Trait implemented by stores that can run DDL statements.
///
/// Implementations execute exactly one statement per call and do not wrap
/// calls in transactions.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Execute a single DDL statement.
    async fn execute(&self, sql: &str) -> Result<(), ExecutionError>;
}
