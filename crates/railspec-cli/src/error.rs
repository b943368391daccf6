//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use railspec_core::{SchemaError, SchemaErrorKind};
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from railspec-core outside the document itself
    #[error("Core error: {0}")]
    Core(railspec_core::Error),

    /// The RAIL document is invalid
    #[error("Invalid RAIL document: {0}")]
    Schema(#[from] SchemaError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} format", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// One or more plugin namespaces could not be installed
    #[error("{count} plugin namespace(s) could not be installed")]
    PluginsFailed { count: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl From<railspec_core::Error> for Error {
    fn from(err: railspec_core::Error) -> Self {
        match err {
            railspec_core::Error::Schema(schema) => Self::Schema(schema),
            other => Self::Core(other),
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Kind of the schema error behind this error, if any
    pub fn schema_kind(&self) -> Option<SchemaErrorKind> {
        match self {
            Self::Schema(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::Schema(_) => 3,
            Self::FileNotFound { .. } => 4,
            Self::InvalidFormat { .. } => 5,
            Self::Config(_) => 6,
            Self::InvalidArgs(_) => 7,
            Self::PluginsFailed { .. } => 8,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let label = match error.schema_kind() {
        Some(kind) => format!("Error [{}]:", kind),
        None => "Error:".to_string(),
    };

    if use_color {
        use colored::Colorize;
        format!("{} {}", label.red().bold(), error)
    } else {
        format!("{} {}", label, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_schema_errors_are_unwrapped() {
        let err: Error = railspec_core::Error::from(SchemaError::MissingPrompt).into();
        assert!(matches!(err, Error::Schema(SchemaError::MissingPrompt)));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.schema_kind(), Some(SchemaErrorKind::MissingPrompt));

        let err: Error = railspec_core::Error::PluginUnavailable {
            namespace: "acme".to_string(),
            path: "$output.a".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Core(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_format_error_plain() {
        let err = Error::from(SchemaError::MissingPrompt);
        assert_eq!(
            format_error(&err, false),
            "Error [MissingPrompt]: Invalid RAIL document: RAIL document must contain a prompt"
        );

        let err = Error::config("bad section");
        assert_eq!(
            format_error(&err, false),
            "Error: Configuration error: bad section"
        );
    }

    #[test]
    fn test_help_only_for_argument_errors() {
        assert!(Error::invalid_args("--save-to").should_show_help());
        assert_eq!(Error::invalid_args("--save-to").exit_code(), 7);
        assert!(!Error::other("boom").should_show_help());
        assert_eq!(Error::PluginsFailed { count: 2 }.exit_code(), 8);
    }
}
