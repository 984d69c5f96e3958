//! StateQL source parser.
//!
//! Parsing runs in two phases: the source is partitioned into entity blocks
//! (a header line plus its `-` field lines), then every block is parsed on
//! its own. All malformed lines are reported, not just the first one.

mod args;
mod blocks;
mod field;

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticCode, ParseReport};
use crate::model::{Entity, SchemaModel};

use blocks::{Block, FIELD_MARKER, partition_blocks};
use field::parse_field_line;

pub use args::{UnterminatedString, parse_action_args, parse_function_args};
pub use field::{FieldShape, classify, is_identifier, parse_field};

/// Options that control how strictly source is read.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Report unknown primitive types as errors instead of warnings.
    pub strict_types: bool,
}

/// Successfully parsed model with the warnings collected along the way.
#[derive(Debug, Clone)]
pub struct ParsedSchema {
    pub model: SchemaModel,
    pub warnings: Vec<Diagnostic>,
}

/// Parse StateQL source with default options.
pub fn parse_source(source: &str) -> Result<ParsedSchema, ParseReport> {
    parse_source_with_options(source, &ParseOptions::default())
}

/// Parse StateQL source into a schema model.
///
/// Returns every error and warning when at least one error was found.
pub fn parse_source_with_options(
    source: &str,
    options: &ParseOptions,
) -> Result<ParsedSchema, ParseReport> {
    let mut report = ParseReport::default();
    let (blocks, orphans) = partition_blocks(source);
    for diagnostic in orphans {
        report.push(diagnostic);
    }

    let mut model = SchemaModel::default();
    let mut declared: HashMap<String, usize> = HashMap::new();

    for block in &blocks {
        let Some(entity) = parse_block(block, options, &mut report) else {
            continue;
        };

        let key = entity.name.to_ascii_lowercase();
        if let Some(first_line) = declared.get(&key) {
            report.push(
                Diagnostic::error(
                    DiagnosticCode::DuplicateEntity,
                    block.header.number,
                    format!("entity '{}' is already declared", entity.name),
                )
                .with_hint(format!("first declared on line {first_line}")),
            );
            continue;
        }

        declared.insert(key, block.header.number);
        model.entities.push(entity);
    }

    if report.is_ok() {
        Ok(ParsedSchema {
            model,
            warnings: report.warnings,
        })
    } else {
        Err(report)
    }
}

fn parse_block(block: &Block<'_>, options: &ParseOptions, report: &mut ParseReport) -> Option<Entity> {
    let header = block.header;
    let name = header
        .text
        .strip_suffix(':')
        .unwrap_or(header.text)
        .trim();

    let header_ok = if name.is_empty() {
        report.push(Diagnostic::error(
            DiagnosticCode::EmptyEntityName,
            header.number,
            "entity header has no name",
        ));
        false
    } else if !is_identifier(name) {
        report.push(
            Diagnostic::error(
                DiagnosticCode::InvalidIdentifier,
                header.number,
                format!("entity name '{name}' is not a valid identifier"),
            )
            .with_hint("entity headers look like `User:`; field lines start with `-`"),
        );
        false
    } else {
        true
    };

    let mut entity = Entity::new(name);
    let mut declared: HashMap<String, usize> = HashMap::new();

    for line in &block.fields {
        let declaration = line.text.strip_prefix(FIELD_MARKER).unwrap_or(line.text).trim();
        let Some(field) = parse_field_line(declaration, line.number, options, report) else {
            continue;
        };

        let key = field.name.to_ascii_lowercase();
        if let Some(first_line) = declared.get(&key) {
            report.push(
                Diagnostic::error(
                    DiagnosticCode::DuplicateField,
                    line.number,
                    format!("field '{}' is already declared on '{name}'", field.name),
                )
                .with_hint(format!("first declared on line {first_line}")),
            );
            continue;
        }

        declared.insert(key, line.number);
        entity.fields.push(field);
    }

    header_ok.then_some(entity)
}
