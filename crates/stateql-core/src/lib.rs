//! Core contracts and parser for StateQL.
//!
//! This crate defines the schema model, the primitive type mapping, the
//! diagnostics produced while reading StateQL source, and the parser itself.
//! Relational compilation lives in `stateql-ddl`.

pub mod diagnostics;
pub mod error;
pub mod model;
pub mod parser;
pub mod types;

pub use diagnostics::{Diagnostic, DiagnosticCode, ParseReport, Severity};
pub use error::{Error, Result};
pub use model::{ActionArgs, Entity, Field, FieldKind, SchemaModel};
pub use parser::{
    FieldShape, ParseOptions, ParsedSchema, classify, is_identifier, parse_action_args, parse_field,
    parse_function_args, parse_source, parse_source_with_options,
};
pub use types::{ColumnType, lookup_column_type, map_column_type};

/// Current contract version for serialized model artifacts.
pub const MODEL_VERSION: &str = "0.1";
