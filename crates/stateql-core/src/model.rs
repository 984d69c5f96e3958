use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parsed StateQL document: entities in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaModel {
    pub entities: Vec<Entity>,
}

impl SchemaModel {
    /// Find an entity by name, ignoring case the same way table names do.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.name.eq_ignore_ascii_case(name))
    }

    pub fn field_count(&self) -> usize {
        self.entities.iter().map(|entity| entity.fields.len()).sum()
    }
}

/// A named grouping of fields, compiled to one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Entity {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }
}

/// One declaration line inside an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl Field {
    pub fn scalar(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar {
                type_name: type_name.into(),
            },
        }
    }

    pub fn many(name: impl Into<String>, target: Option<String>, through: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::ManyRelation {
                target,
                through: through.into(),
            },
        }
    }

    /// Type stored in this field's column, when the field has one.
    ///
    /// Scalar and computed fields are materialized as ordinary columns.
    pub fn column_type_name(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Scalar { type_name } | FieldKind::Computed { type_name, .. } => {
                Some(type_name.as_str())
            }
            FieldKind::ManyRelation { .. } | FieldKind::Action { .. } => None,
        }
    }
}

/// Field shape with its per-kind payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain column of a primitive type.
    Scalar { type_name: String },
    /// Many-to-many edge joined through a field on the related side.
    ManyRelation {
        /// Related entity as written in source; never validated.
        target: Option<String>,
        through: String,
    },
    /// Invocable verb with its arguments.
    Action { verb: String, args: ActionArgs },
    /// Derived value stored as a column of `type_name`.
    Computed {
        type_name: String,
        function: String,
        args: Vec<String>,
    },
}

/// Arguments of an action, kept as three separate channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActionArgs {
    pub positional: Vec<String>,
    pub named: BTreeMap<String, String>,
    /// Parameters supplied at invocation time (`:name` in source).
    pub required_params: Vec<String>,
}

impl ActionArgs {
    /// Resolve an argument by key.
    ///
    /// Named arguments win; otherwise `argN` addresses the N-th positional
    /// argument (1-based).
    pub fn get(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.named.get(key) {
            return Some(value.as_str());
        }

        let index = key.strip_prefix("arg")?.parse::<usize>().ok()?;
        self.positional.get(index.checked_sub(1)?).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty() && self.required_params.is_empty()
    }
}
