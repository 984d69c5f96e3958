//! Relational DDL for StateQL schema models.
//!
//! Compilation is pure and produces ordered statements; execution goes
//! through a [`StatementExecutor`], with a PostgreSQL implementation provided.

pub mod apply;
pub mod compiler;
pub mod executor;
mod keywords;
pub mod options;
pub mod postgres;
pub mod statement;

pub use apply::{ApplyReport, apply};
pub use compiler::{MAX_IDENTIFIER_LEN, compile};
pub use executor::{ExecutionError, StatementExecutor};
pub use options::{CompileOptions, IdPolicy};
pub use postgres::{PostgresExecutor, apply_postgres, apply_postgres_with_options};
pub use statement::{DdlStatement, StatementKind};

pub use stateql_core::SchemaModel;
