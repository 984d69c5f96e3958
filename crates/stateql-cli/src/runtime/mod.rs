mod logging;
mod output;
mod settings;

pub use logging::init_logging;
pub use output::{ModelArtifact, write_json};
pub use settings::{LogFormat, Settings, load_settings};

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing the CLI runtime or writing artifacts.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings in {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("settings file not found: {0}")]
    MissingSettings(PathBuf),
    #[error("logging error: {0}")]
    Logging(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;
