use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use stateql_ddl::IdPolicy;

use super::{RuntimeError, RuntimeResult};

/// Settings file looked up in the working directory when `--config` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "stateql.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub database_url: Option<String>,
    pub strict_types: bool,
    pub id_policy: IdPolicy,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
}

/// Load settings from `path`, or from [`DEFAULT_SETTINGS_FILE`] if it exists.
///
/// An explicit path must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> RuntimeResult<Settings> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };

    if !path.exists() {
        if required {
            return Err(RuntimeError::MissingSettings(path));
        }
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(&path)?;
    parse_settings(&content).map_err(|source| RuntimeError::Settings { path, source })
}

fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}
