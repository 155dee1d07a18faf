//! Error types for compose-core operations.
//!
//! This module defines [`ComposeError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Malformed templates and unmet required variables share one kind,
//!   [`ComposeError::InvalidTemplate`], so callers can abort a load on either
//! - Document-level interpolation wraps it with the failing key path
//! - Progress rendering never produces an error for the operation it observes;
//!   only [`ComposeError::Cancelled`] leaves a renderer loop

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for compose-core operations.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A template is syntactically invalid, or a required variable is unmet.
    #[error("Invalid template: {template:?}")]
    InvalidTemplate { template: String },

    /// Interpolation failed for a value inside a configuration document.
    #[error("Invalid interpolation format for {path:?}: {source}")]
    Interpolation {
        path: String,
        #[source]
        source: Box<ComposeError>,
    },

    /// No compose file found at the expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a compose or env file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A progress renderer was stopped through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ComposeError {
    /// Build an [`ComposeError::InvalidTemplate`] for the given text.
    pub fn invalid_template(template: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
        }
    }

    /// Whether this error came from a template, directly or through a document path.
    pub fn is_invalid_template(&self) -> bool {
        match self {
            Self::InvalidTemplate { .. } => true,
            Self::Interpolation { source, .. } => source.is_invalid_template(),
            _ => false,
        }
    }
}

/// Result type alias for compose-core operations.
pub type Result<T> = std::result::Result<T, ComposeError>;
