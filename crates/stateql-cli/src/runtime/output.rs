use std::fs::create_dir_all;
use std::path::Path;

use serde::Serialize;
use stateql_core::{Diagnostic, MODEL_VERSION, SchemaModel};

use super::RuntimeResult;

/// JSON document written by `stateql model`.
#[derive(Debug, Serialize)]
pub struct ModelArtifact<'a> {
    pub model_version: &'static str,
    pub source: String,
    pub model: &'a SchemaModel,
    pub warnings: &'a [Diagnostic],
}

impl<'a> ModelArtifact<'a> {
    pub fn new(source: &Path, model: &'a SchemaModel, warnings: &'a [Diagnostic]) -> Self {
        Self {
            model_version: MODEL_VERSION,
            source: source.display().to_string(),
            model,
            warnings,
        }
    }
}

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> RuntimeResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let mut payload = serde_json::to_vec_pretty(value)?;
    payload.push(b'\n');
    std::fs::write(path, payload)?;
    Ok(())
}
