use std::collections::{BTreeSet, HashMap};

use stateql_core::{
    ColumnType, Entity, Error, Field, FieldKind, Result, SchemaModel, is_identifier,
    lookup_column_type,
};
use tracing::{debug, warn};

use crate::keywords::quote;
use crate::options::{CompileOptions, IdPolicy};
use crate::statement::{DdlStatement, StatementKind};

/// Longest identifier PostgreSQL keeps without truncating.
pub const MAX_IDENTIFIER_LEN: usize = 63;

const PRIMARY_KEY: &str = "id";
const SYNTHETIC_KEY: &str = "id SERIAL PRIMARY KEY";

/// Primary key of a compiled entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableKey {
    /// Auto-incrementing `id` added by the compiler.
    Synthetic,
    /// The entity's own `id` field, adopted as the key.
    Declared(ColumnType),
}

impl TableKey {
    /// Column type used by foreign keys pointing at this table.
    fn reference_type(self) -> ColumnType {
        match self {
            TableKey::Synthetic => ColumnType::Integer,
            TableKey::Declared(column_type) => column_type,
        }
    }
}

/// Compile a schema model into DDL statements.
///
/// Entity tables come first, in declaration order, followed by one junction
/// table per many-relationship field. Every statement is guarded by
/// `IF NOT EXISTS`. The first invalid construct aborts compilation.
pub fn compile(model: &SchemaModel, options: &CompileOptions) -> Result<Vec<DdlStatement>> {
    let mut keys = HashMap::new();
    for entity in &model.entities {
        let table = identifier(&entity.name)?;
        let key = table_key(entity, options)?;
        if keys.insert(table.clone(), key).is_some() {
            return Err(Error::InvalidSchema(format!("duplicate table name: {table}")));
        }
    }

    let mut statements = Vec::new();
    for entity in &model.entities {
        let table = identifier(&entity.name)?;
        let key = keys.get(&table).copied().unwrap_or(TableKey::Synthetic);
        statements.push(create_table(entity, table, key)?);
    }

    for entity in &model.entities {
        for field in &entity.fields {
            if let FieldKind::ManyRelation { through, .. } = &field.kind {
                statements.push(create_junction(entity, field, through, &keys)?);
            }
        }
    }

    let mut tables = BTreeSet::new();
    for statement in &statements {
        if !tables.insert(statement.table.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {}",
                statement.table
            )));
        }
        debug!(event = "statement_compiled", table = %statement.table, kind = ?statement.kind);
    }

    Ok(statements)
}

fn table_key(entity: &Entity, options: &CompileOptions) -> Result<TableKey> {
    // Relationships and actions named `id` produce no column.
    let Some((field, type_name)) = entity
        .field(PRIMARY_KEY)
        .and_then(|field| field.column_type_name().map(|type_name| (field, type_name)))
    else {
        return Ok(TableKey::Synthetic);
    };

    match options.id_policy {
        IdPolicy::Adopt => Ok(TableKey::Declared(column_type(entity, field, type_name))),
        IdPolicy::Reject => Err(Error::PrimaryKeyCollision {
            entity: entity.name.clone(),
        }),
    }
}

fn create_table(entity: &Entity, table: String, key: TableKey) -> Result<DdlStatement> {
    let mut columns = Vec::new();
    let mut names = BTreeSet::new();

    if key == TableKey::Synthetic {
        columns.push(SYNTHETIC_KEY.to_string());
        names.insert(PRIMARY_KEY.to_string());
    }

    for field in &entity.fields {
        let Some(type_name) = field.column_type_name() else {
            continue;
        };

        let column = identifier(&field.name)?;
        if !names.insert(column.clone()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate column name: {table}.{column}"
            )));
        }

        match key {
            TableKey::Declared(key_type) if column == PRIMARY_KEY => {
                columns.push(format!("{} {key_type} PRIMARY KEY", quote(&column)));
            }
            _ => {
                let column_type = column_type(entity, field, type_name);
                columns.push(format!("{} {column_type}", quote(&column)));
            }
        }
    }

    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote(&table),
        columns.join(", ")
    );

    Ok(DdlStatement {
        kind: StatementKind::Table,
        table,
        sql,
    })
}

fn create_junction(
    entity: &Entity,
    field: &Field,
    through: &str,
    keys: &HashMap<String, TableKey>,
) -> Result<DdlStatement> {
    let through = through.trim();
    if through.is_empty() {
        return Err(Error::InvalidRelationshipClause {
            entity: entity.name.clone(),
            field: field.name.clone(),
        });
    }

    let owner = identifier(&entity.name)?;
    let related = identifier(through)?;
    let table = identifier(&format!("{owner}_{}", field.name))?;
    let owner_column = identifier(&format!("{owner}_id"))?;
    let related_column = identifier(&format!("{related}_id"))?;

    if owner_column == related_column {
        return Err(Error::JunctionColumnCollision {
            table,
            column: owner_column,
        });
    }

    let owner_type = reference_type(keys, &owner);
    let related_type = reference_type(keys, &related);

    let (owner_column_sql, related_column_sql) = (quote(&owner_column), quote(&related_column));
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         {owner_column_sql} {owner_type} REFERENCES {}(id), \
         {related_column_sql} {related_type} REFERENCES {}(id), \
         PRIMARY KEY ({owner_column_sql}, {related_column_sql}))",
        quote(&table),
        quote(&owner),
        quote(&related),
    );

    Ok(DdlStatement {
        kind: StatementKind::Junction,
        table,
        sql,
    })
}

fn reference_type(keys: &HashMap<String, TableKey>, table: &str) -> ColumnType {
    keys.get(table)
        .copied()
        .unwrap_or(TableKey::Synthetic)
        .reference_type()
}

fn column_type(entity: &Entity, field: &Field, type_name: &str) -> ColumnType {
    lookup_column_type(type_name).unwrap_or_else(|| {
        warn!(
            event = "column_type_fallback",
            entity = %entity.name,
            field = %field.name,
            type_name = %type_name,
            fallback = %ColumnType::FALLBACK
        );
        ColumnType::FALLBACK
    })
}

/// Lowercase a name and check it is usable as an unquoted identifier.
fn identifier(name: &str) -> Result<String> {
    let lowered = name.to_ascii_lowercase();
    if !is_identifier(&lowered) {
        return Err(Error::InvalidSchema(format!(
            "'{name}' is not a valid SQL identifier"
        )));
    }
    if lowered.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::IdentifierTooLong {
            len: lowered.len(),
            identifier: lowered,
            max: MAX_IDENTIFIER_LEN,
        });
    }
    Ok(lowered)
}
