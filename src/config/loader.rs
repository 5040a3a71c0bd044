//! Configuration file discovery and loading.

use crate::config::schema::PipelineConfig;
use crate::config::validator::validate;
use crate::error::{RelayError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration location relative to the workspace.
pub const DEFAULT_CONFIG_PATH: &str = ".github/release.yml";

/// Resolve the configuration path: an explicit path wins, relative paths
/// are taken from the workspace.
pub fn config_path(workspace: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => workspace.join(path),
        None => workspace.join(DEFAULT_CONFIG_PATH),
    }
}

/// Load a configuration file from a specific path.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is malformed.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RelayError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RelayError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| RelayError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and validate the pipeline configuration for a workspace.
pub fn load_config(workspace: &Path, explicit: Option<&Path>) -> Result<PipelineConfig> {
    let path = config_path(workspace, explicit);
    tracing::debug!("Loading pipeline config from {}", path.display());

    let config = load_config_file(&path)?;
    validate(&config)?;
    Ok(config)
}
