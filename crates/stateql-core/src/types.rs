use std::fmt;

use serde::{Deserialize, Serialize};

/// Relational column types produced for StateQL primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Numeric,
    Boolean,
    Date,
    Timestamp,
    Integer,
}

impl ColumnType {
    /// Column type used when a primitive name has no mapping.
    pub const FALLBACK: ColumnType = ColumnType::Text;

    /// Postgres spelling of the type.
    pub fn as_sql(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Integer => "INTEGER",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Look up the column type for a StateQL primitive (case-insensitive).
///
/// Returns `None` for names without a mapping so callers can report them.
pub fn lookup_column_type(primitive: &str) -> Option<ColumnType> {
    match primitive.to_ascii_lowercase().as_str() {
        "text" => Some(ColumnType::Text),
        "number" => Some(ColumnType::Numeric),
        "switch" => Some(ColumnType::Boolean),
        "date" => Some(ColumnType::Date),
        "timestamp" => Some(ColumnType::Timestamp),
        "seconds" => Some(ColumnType::Integer),
        _ => None,
    }
}

/// Map a StateQL primitive to its column type, falling back to TEXT.
pub fn map_column_type(primitive: &str) -> ColumnType {
    lookup_column_type(primitive).unwrap_or(ColumnType::FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_known_primitive() {
        let cases = [
            ("text", "TEXT"),
            ("number", "NUMERIC"),
            ("switch", "BOOLEAN"),
            ("date", "DATE"),
            ("timestamp", "TIMESTAMP"),
            ("seconds", "INTEGER"),
        ];
        for (primitive, sql) in cases {
            assert_eq!(map_column_type(primitive).as_sql(), sql, "{primitive}");
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup_column_type("Switch"), Some(ColumnType::Boolean));
        assert_eq!(lookup_column_type("TIMESTAMP"), Some(ColumnType::Timestamp));
    }

    #[test]
    fn unknown_primitive_falls_back_to_text() {
        assert_eq!(lookup_column_type("json"), None);
        assert_eq!(map_column_type("json"), ColumnType::Text);
        assert_eq!(map_column_type(""), ColumnType::Text);
    }
}
