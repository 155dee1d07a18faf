//! compose-core - Compose file interpolation and progress rendering.
//!
//! The crate has two independent engines:
//! - the interpolation engine resolves `$VAR` / `${VAR...}` references in a
//!   compose document before it is mapped to typed configuration
//! - the progress engine collects task events from concurrent operations and
//!   renders them as a live terminal display, plain lines, or JSON
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Template substitution, variable extraction, and loading
//! - [`error`] - Error types and result aliases
//! - [`progress`] - Progress events and writers
//!
//! # Example
//!
//! ```
//! use compose_core::config::{substitute, Environment};
//!
//! let env = Environment::new().with_override("TAG", "1.25");
//! let image = substitute("nginx:${TAG:-latest}", &env).unwrap();
//! assert_eq!(image, "nginx:1.25");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod progress;

pub use error::{ComposeError, Result};
