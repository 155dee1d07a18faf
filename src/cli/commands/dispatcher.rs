//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::io::Write;
use std::path::Path;

use crate::cli::args::{Cli, Commands};
use crate::config::ConfigPaths;
use crate::error::Result;
use crate::progress::{should_use_colors, RenderConfig};

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, writing its primary output to `out`.
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Exit status for the process. Codes outside `0..=255` become 1.
    pub fn process_exit_code(&self) -> u8 {
        u8::try_from(self.exit_code).unwrap_or(1)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    paths: ConfigPaths,
    render: RenderConfig,
}

impl CommandDispatcher {
    /// Create a dispatcher for a project.
    pub fn new(paths: ConfigPaths, render: RenderConfig) -> Self {
        Self { paths, render }
    }

    /// Build a dispatcher from the global CLI flags.
    ///
    /// `project_dir` is used when `--project-directory` is not given.
    pub fn from_cli(cli: &Cli, project_dir: &Path) -> Self {
        let project_dir = cli.project_directory.as_deref().unwrap_or(project_dir);
        let paths = ConfigPaths::discover(project_dir, cli.file.as_deref(), cli.env_file.as_deref());
        let render = RenderConfig::new(cli.progress)
            .with_color(!cli.no_color && should_use_colors())
            .with_dry_run(cli.dry_run);
        Self::new(paths, render)
    }

    /// Paths of the project being operated on.
    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Progress rendering options.
    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, command: &Commands, out: &mut dyn Write) -> Result<CommandResult> {
        match command {
            Commands::Config(args) => {
                let cmd = super::config::ConfigCommand::new(self.paths.clone(), args.clone());
                cmd.execute(out)
            }
            Commands::Variables(args) => {
                let cmd = super::variables::VariablesCommand::new(self.paths.clone(), args.clone());
                cmd.execute(out)
            }
            Commands::Events(args) => {
                let cmd = super::events::EventsCommand::new(self.render.clone(), args.clone());
                cmd.execute(out)
            }
        }
    }
}
