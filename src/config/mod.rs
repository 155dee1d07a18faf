//! Compose configuration loading and variable interpolation.
//!
//! This module handles:
//! - Template scanning and substitution in [`template`]
//! - Variable inventory in [`extract`]
//! - Whole-document interpolation in [`interpolation`]
//! - `.env` parsing in [`env_file`] and variable sources in [`environment`]
//! - Compose file discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use compose_core::config::{load_project, ConfigPaths, Environment};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("compose.yaml"), "image: app:${TAG:-latest}").unwrap();
//!
//! let paths = ConfigPaths::discover(temp.path(), None, None);
//! let doc = load_project(&paths, &Environment::new()).unwrap();
//! assert_eq!(doc["image"], "app:latest");
//! ```

pub mod env_file;
pub mod environment;
pub mod extract;
pub mod interpolation;
pub mod loader;
pub mod template;

pub use env_file::EnvFileParser;
pub use environment::Environment;
pub use extract::{extract_variables, Variable};
pub use interpolation::{interpolate, interpolate_with, InterpolateOptions};
pub use loader::{
    find_compose_file, load_config_value, load_project, parse_config, ConfigPaths,
    COMPOSE_FILE_NAMES, DEFAULT_ENV_FILE,
};
pub use template::{
    default_operators, hard_default, has_interpolation, required, required_non_empty,
    soft_default, substitute, substitute_with, Mapping, Operator, Pattern, SubstituteFunc,
};
