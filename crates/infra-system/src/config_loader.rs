//! YAML command file loading.
//!
//! The file has a single top-level `commands` list; each entry carries
//! `name`, `cmd` and `output`.

use batchrun_core::domain::{Config, DomainError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur when loading the command file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file.
    #[error("failed to read config file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML.
    #[error("YAML parse error in '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Parsed, but an entry is unusable.
    #[error("invalid configuration in '{path}': {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: DomainError,
    },
}

/// Read, parse and validate the command file at `path`.
pub async fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    let config = parse_config(&text).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    config.validate().map_err(|source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    for (index, command) in config.commands.iter().enumerate() {
        if command.name.trim().is_empty() {
            warn!(index, output = %command.output, "Command has no name");
        }
    }

    info!(path = %path.display(), commands = config.len(), "Loaded command file");
    Ok(config)
}

/// Parse YAML text into a [`Config`] without validating it.
pub fn parse_config(text: &str) -> Result<Config, serde_yaml::Error> {
    serde_yaml::from_str(text)
}
