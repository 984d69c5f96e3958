use thiserror::Error;

use crate::diagnostics::ParseReport;

/// Core error type shared across StateQL crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The source text could not be parsed into a model.
    #[error("{0}")]
    Parse(ParseReport),
    /// The model violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// An entity declares a field named `id`, which collides with the synthetic key.
    #[error("entity '{entity}' declares a field named 'id' which collides with the synthetic primary key")]
    PrimaryKeyCollision { entity: String },
    /// A many-relationship has no usable `thru` target.
    #[error("many-relationship '{entity}.{field}' has no 'thru' field to join on")]
    InvalidRelationshipClause { entity: String, field: String },
    /// Both sides of a junction table resolve to the same column name.
    #[error("junction table '{table}' would declare column '{column}' twice")]
    JunctionColumnCollision { table: String, column: String },
    /// A generated identifier exceeds the store's identifier length.
    #[error("identifier '{identifier}' is {len} bytes long (max {max})")]
    IdentifierTooLong {
        identifier: String,
        len: usize,
        max: usize,
    },
    /// The statement executor rejected a DDL statement. Displays the executor message verbatim.
    #[error("{message}")]
    StatementExecution { table: String, message: String },
}

/// Convenience alias for results returned by StateQL crates.
pub type Result<T> = std::result::Result<T, Error>;

impl From<ParseReport> for Error {
    fn from(report: ParseReport) -> Self {
        Error::Parse(report)
    }
}
