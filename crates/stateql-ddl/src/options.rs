use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do when an entity declares its own `id` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Fail with a primary key collision.
    #[default]
    Reject,
    /// Drop the synthetic key and make the declared field the primary key.
    Adopt,
}

impl FromStr for IdPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "reject" => Ok(IdPolicy::Reject),
            "adopt" => Ok(IdPolicy::Adopt),
            other => Err(format!("unknown id policy '{other}' (expected reject or adopt)")),
        }
    }
}

impl fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdPolicy::Reject => f.write_str("reject"),
            IdPolicy::Adopt => f.write_str("adopt"),
        }
    }
}

/// Options that control how a model is compiled to DDL.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub id_policy: IdPolicy,
}
