//! Config command implementation.
//!
//! The `compose-core config` command prints the compose file with every
//! variable reference resolved.

use std::io::Write;

use crate::cli::args::ConfigArgs;
use crate::config::{load_project, ConfigPaths};
use crate::error::{ComposeError, Result};

use super::dispatcher::{Command, CommandResult};

/// The config command implementation.
pub struct ConfigCommand {
    paths: ConfigPaths,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(paths: ConfigPaths, args: ConfigArgs) -> Self {
        Self { paths, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

impl Command for ConfigCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let env = self.paths.environment()?;
        let document = load_project(&self.paths, &env)?;

        let rendered = if self.args.json {
            serde_json::to_string_pretty(&document).map_err(|e| ComposeError::Other(e.into()))?
        } else {
            serde_yaml::to_string(&document).map_err(|e| ComposeError::Other(e.into()))?
        };
        writeln!(out, "{}", rendered.trim_end())?;

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_project(compose: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("compose.yaml"), compose).unwrap();
        temp
    }

    fn run(temp: &TempDir, args: ConfigArgs) -> Result<String> {
        let cmd = ConfigCommand::new(ConfigPaths::discover(temp.path(), None, None), args);
        let mut out = Vec::new();
        cmd.execute(&mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn config_no_compose_file() {
        let temp = TempDir::new().unwrap();
        let result = run(&temp, ConfigArgs::default());
        assert!(matches!(result, Err(ComposeError::ConfigNotFound { .. })));
    }

    #[test]
    fn config_resolves_defaults() {
        let temp = setup_project("services:\n  web:\n    image: \"nginx:${COMPOSE_CORE_UNSET_TAG:-latest}\"\n");
        let out = run(&temp, ConfigArgs::default()).unwrap();
        assert!(out.contains("image: nginx:latest"));
    }

    #[test]
    fn config_uses_env_file() {
        let temp = setup_project("image: \"app:${COMPOSE_CORE_FILE_TAG}\"\n");
        fs::write(temp.path().join(".env"), "COMPOSE_CORE_FILE_TAG=2.0\n").unwrap();
        let out = run(&temp, ConfigArgs::default()).unwrap();
        assert!(out.contains("app:2.0"));
    }

    #[test]
    fn config_json_output() {
        let temp = setup_project("name: demo\nreplicas: 2\n");
        let out = run(&temp, ConfigArgs { json: true }).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "demo");
        assert_eq!(value["replicas"], 2);
    }

    #[test]
    fn config_reports_missing_required_variable() {
        let temp = setup_project(
            "password: \"${COMPOSE_CORE_UNSET_PASSWORD:?database password is required}\"\n",
        );
        let err = run(&temp, ConfigArgs::default()).unwrap_err();
        assert!(err.is_invalid_template());
        assert!(err.to_string().contains("database password is required"));
    }
}
