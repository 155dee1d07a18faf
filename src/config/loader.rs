//! Compose file discovery and loading.
//!
//! Loading reads the raw document, builds the variable namespace from the
//! process environment and the project's `.env` file, and interpolates the
//! whole document before anything else looks at it.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::environment::Environment;
use super::interpolation::interpolate;
use crate::error::{ComposeError, Result};

/// Compose file names looked up in a project directory, in priority order.
pub const COMPOSE_FILE_NAMES: &[&str] = &[
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// Name of the env file read from the project directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Paths involved in loading a project.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project directory.
    pub project_dir: PathBuf,

    /// The compose file, if one was found or given.
    pub compose_file: Option<PathBuf>,

    /// Env file (may not exist).
    pub env_file: PathBuf,
}

impl ConfigPaths {
    /// Discover the compose file and env file for `project_dir`.
    ///
    /// An explicit `file` is used as-is, relative paths resolved against the
    /// project directory.
    pub fn discover(project_dir: &Path, file: Option<&Path>, env_file: Option<&Path>) -> Self {
        let compose_file = match file {
            Some(path) => Some(project_dir.join(path)),
            None => find_compose_file(project_dir),
        };
        let env_file = env_file
            .map(|p| project_dir.join(p))
            .unwrap_or_else(|| project_dir.join(DEFAULT_ENV_FILE));

        tracing::debug!(
            "Compose file: {:?}, env file: {}",
            compose_file,
            env_file.display()
        );

        Self {
            project_dir: project_dir.to_path_buf(),
            compose_file,
            env_file,
        }
    }

    /// The compose file, or `ConfigNotFound` for the project directory.
    pub fn require_compose_file(&self) -> Result<&Path> {
        self.compose_file
            .as_deref()
            .ok_or_else(|| ComposeError::ConfigNotFound {
                path: self.project_dir.clone(),
            })
    }

    /// Environment for this project: process variables over the env file.
    pub fn environment(&self) -> Result<Environment> {
        Environment::from_process().with_env_file(&self.env_file)
    }
}

/// Find the first known compose file name in `dir`.
pub fn find_compose_file(dir: &Path) -> Option<PathBuf> {
    COMPOSE_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load a compose file as a raw YAML value, without interpolation.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ComposeError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ComposeError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a raw value.
pub fn parse_config(content: &str, source_path: &Path) -> Result<Value> {
    serde_yaml::from_str(content).map_err(|e| ComposeError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and interpolate the compose file described by `paths`.
pub fn load_project(paths: &ConfigPaths, env: &Environment) -> Result<Value> {
    let raw = load_config_value(paths.require_compose_file()?)?;
    interpolate(&raw, env)
}
