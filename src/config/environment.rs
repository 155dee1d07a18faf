//! Interpolation variable sources.
//!
//! Variables are resolved in priority order:
//! 1. Explicit overrides (highest priority)
//! 2. Process environment
//! 3. `.env` file (lowest priority)

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;

use super::env_file::EnvFileParser;
use super::template::Mapping;
use crate::error::Result;

/// Layered variable namespace used for interpolation.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Values set explicitly by the caller.
    pub overrides: HashMap<String, String>,

    /// Process environment.
    pub process: HashMap<String, String>,

    /// Values read from a `.env` file.
    pub dotenv: HashMap<String, String>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment seeded with the current process environment.
    ///
    /// Entries whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self {
            process: utf8_vars(std::env::vars_os()),
            ..Default::default()
        }
    }

    /// Add values from a `.env` file, if it exists.
    ///
    /// References and bare keys in the file resolve against the overrides
    /// and the process environment.
    pub fn with_env_file(mut self, path: &Path) -> Result<Self> {
        let dotenv = EnvFileParser::load_optional(path, &self)?;
        self.dotenv = dotenv;
        tracing::debug!(
            "Loaded {} variables from {}",
            self.dotenv.len(),
            path.display()
        );
        Ok(self)
    }

    /// Set an override value.
    pub fn with_override(mut self, name: &str, value: &str) -> Self {
        self.overrides.insert(name.to_string(), value.to_string());
        self
    }

    /// Resolve a variable name to its value.
    ///
    /// Resolution order: overrides > process > dotenv
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .or_else(|| self.process.get(name))
            .or_else(|| self.dotenv.get(name))
            .cloned()
    }
}

fn utf8_vars<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                tracing::debug!("Skipping non UTF-8 environment variable {:?}", key);
                None
            }
        })
        .collect()
}

impl Mapping for Environment {
    fn lookup(&self, name: &str) -> Option<String> {
        self.resolve(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::substitute;
    use tempfile::TempDir;

    #[test]
    fn resolve_uses_priority_order() {
        let mut env = Environment::new();
        env.overrides
            .insert("var".to_string(), "from_override".to_string());
        env.process
            .insert("var".to_string(), "from_process".to_string());
        env.dotenv.insert("var".to_string(), "from_dotenv".to_string());

        assert_eq!(env.resolve("var"), Some("from_override".to_string()));

        env.overrides.clear();
        assert_eq!(env.resolve("var"), Some("from_process".to_string()));

        env.process.clear();
        assert_eq!(env.resolve("var"), Some("from_dotenv".to_string()));
    }

    #[test]
    fn empty_value_is_distinct_from_absent() {
        let env = Environment::new().with_override("EMPTY", "");
        assert_eq!(env.lookup("EMPTY"), Some(String::new()));
        assert_eq!(env.lookup("MISSING"), None);
    }

    #[test]
    fn with_env_file_loads_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        std::fs::write(&path, "TAG=from-file\n").unwrap();

        let env = Environment::new().with_env_file(&path).unwrap();
        assert_eq!(env.resolve("TAG"), Some("from-file".to_string()));
    }

    #[test]
    fn env_file_sees_process_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        std::fs::write(&path, "REGISTRY\nIMAGE=${REGISTRY}/app\n").unwrap();

        let mut env = Environment::new();
        env.process
            .insert("REGISTRY".to_string(), "ghcr.io".to_string());
        let env = env.with_env_file(&path).unwrap();
        assert_eq!(env.dotenv.get("REGISTRY"), Some(&"ghcr.io".to_string()));
        assert_eq!(env.resolve("IMAGE"), Some("ghcr.io/app".to_string()));
    }

    #[test]
    fn with_env_file_tolerates_missing_file() {
        let temp = TempDir::new().unwrap();
        let env = Environment::new()
            .with_env_file(&temp.path().join(".env"))
            .unwrap();
        assert!(env.dotenv.is_empty());
    }

    #[test]
    fn environment_is_a_mapping() {
        let env = Environment::new().with_override("TAG", "1.2");
        assert_eq!(substitute("app:${TAG:-latest}", &env).unwrap(), "app:1.2");
    }

    #[test]
    fn from_process_reads_environment() {
        let env = Environment::from_process();
        assert_eq!(env.process.len(), utf8_vars(std::env::vars_os()).len());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_variables_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = utf8_vars(vec![
            (OsString::from("TAG"), OsString::from("1.0")),
            (OsString::from("BAD_VALUE"), OsString::from_vec(vec![0xff])),
            (OsString::from_vec(vec![b'K', 0xfe]), OsString::from("x")),
        ]);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("TAG"), Some(&"1.0".to_string()));
    }
}
