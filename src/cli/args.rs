//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::progress::Mode;

/// compose-core - Compose file interpolation and progress rendering.
#[derive(Debug, Parser)]
#[command(name = "compose-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Compose file (overrides discovery in the project directory)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_directory: Option<PathBuf>,

    /// Env file (defaults to .env in the project directory)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Progress output: auto, tty, plain, quiet or json
    #[arg(
        long,
        global = true,
        env = "COMPOSE_PROGRESS",
        default_value = "auto"
    )]
    pub progress: Mode,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Mark progress output as a dry run
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the resolved compose file
    Config(ConfigArgs),

    /// List the variables referenced by the compose file
    Variables(VariablesArgs),

    /// Replay a newline-delimited JSON stream of progress events
    Events(EventsArgs),
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `variables` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct VariablesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `events` command.
#[derive(Debug, Clone, clap::Args)]
pub struct EventsArgs {
    /// File to read events from (stdin when omitted)
    pub file: Option<PathBuf>,

    /// Title of the progress header
    #[arg(long, default_value = "Running")]
    pub title: String,
}

impl Default for EventsArgs {
    fn default() -> Self {
        Self {
            file: None,
            title: "Running".to_string(),
        }
    }
}
