//! Command-line interface for compose-core.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`table`] - Column-aligned output for listings

pub mod args;
pub mod commands;
pub mod table;

pub use args::{Cli, Commands, ConfigArgs, EventsArgs, VariablesArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use table::Table;
