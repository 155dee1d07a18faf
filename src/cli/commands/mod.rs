//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations and resolves the global flags
//! (project directory, env file, progress mode) once for all of them.

pub mod config;
pub mod dispatcher;
pub mod events;
pub mod variables;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
