use serde::{Deserialize, Serialize};

/// Which compiler pass produced a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// One table per entity.
    Table,
    /// One junction table per many-relationship field.
    Junction,
}

/// A single DDL statement and the table it creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdlStatement {
    pub kind: StatementKind,
    pub table: String,
    pub sql: String,
}
