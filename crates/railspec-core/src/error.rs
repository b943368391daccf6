//! Error types for the Railspec core library
//!
//! Schema errors are terminal: they describe an author-supplied document that
//! cannot be transcoded, never a transient fault. Engine collaborators report
//! their own failures through `anyhow`, which the binder wraps with the path of
//! the node being bound.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while parsing, encoding, decoding or binding a RAIL document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The `<rail>` root (or persisted `version` key) is not `0.1`
    #[error("Unsupported RAIL version {}: the root element must be <rail version=\"0.1\">", found.as_deref().unwrap_or("<missing>"))]
    UnsupportedVersion { found: Option<String> },

    /// The document has no `<prompt>`
    #[error("RAIL document must contain a prompt")]
    MissingPrompt,

    /// `<script>` declares a language other than python
    #[error("Unsupported script language '{language}': only 'python' is accepted")]
    UnsupportedScriptLanguage { language: String },

    /// No constructor is registered for a node's type tag
    #[error("Unknown type '{type_tag}' at {path}")]
    UnknownType { type_tag: String, path: String },

    /// A formatter token has unbalanced braces
    #[error("Malformed format string '{token}' at {path}: unbalanced braces")]
    MalformedFormatString { token: String, path: String },

    /// A JSON map reads both as a node and as a named-children map
    #[error("Ambiguous node shape at {path}: keys [{}] match node attributes but do not decode as a node", keys.join(", "))]
    AmbiguousNodeShape { path: String, keys: Vec<String> },

    /// The document is not well-formed XML or its root is not `<rail>`
    #[error("Malformed RAIL XML: {message}")]
    MalformedXml { message: String },

    /// A value has the wrong shape or a required attribute is missing
    #[error("Invalid field at {path}: expected {expected}")]
    InvalidField { path: String, expected: String },
}

/// Fieldless discriminant of [`SchemaError`], stable across messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaErrorKind {
    UnsupportedVersion,
    MissingPrompt,
    UnsupportedScriptLanguage,
    UnknownType,
    MalformedFormatString,
    AmbiguousNodeShape,
    MalformedXml,
    InvalidField,
}

impl SchemaError {
    /// Create an invalid field error
    pub fn invalid_field<P, E>(path: P, expected: E) -> Self
    where
        P: Into<String>,
        E: Into<String>,
    {
        Self::InvalidField {
            path: path.into(),
            expected: expected.into(),
        }
    }

    /// Get the kind of this error
    pub fn kind(&self) -> SchemaErrorKind {
        match self {
            Self::UnsupportedVersion { .. } => SchemaErrorKind::UnsupportedVersion,
            Self::MissingPrompt => SchemaErrorKind::MissingPrompt,
            Self::UnsupportedScriptLanguage { .. } => SchemaErrorKind::UnsupportedScriptLanguage,
            Self::UnknownType { .. } => SchemaErrorKind::UnknownType,
            Self::MalformedFormatString { .. } => SchemaErrorKind::MalformedFormatString,
            Self::AmbiguousNodeShape { .. } => SchemaErrorKind::AmbiguousNodeShape,
            Self::MalformedXml { .. } => SchemaErrorKind::MalformedXml,
            Self::InvalidField { .. } => SchemaErrorKind::InvalidField,
        }
    }

    /// HTTP status an API layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownType { .. } => 422,
            _ => 400,
        }
    }

    /// Schema errors describe invalid input and never succeed on retry
    pub fn is_retryable(&self) -> bool {
        false
    }
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaErrorKind::UnsupportedVersion => "UnsupportedVersion",
            SchemaErrorKind::MissingPrompt => "MissingPrompt",
            SchemaErrorKind::UnsupportedScriptLanguage => "UnsupportedScriptLanguage",
            SchemaErrorKind::UnknownType => "UnknownType",
            SchemaErrorKind::MalformedFormatString => "MalformedFormatString",
            SchemaErrorKind::AmbiguousNodeShape => "AmbiguousNodeShape",
            SchemaErrorKind::MalformedXml => "MalformedXml",
            SchemaErrorKind::InvalidField => "InvalidField",
        };
        write!(f, "{}", name)
    }
}

/// Result type for parse, encode and decode operations
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Main error type for operations that reach outside the schema itself
#[derive(Error, Debug)]
pub enum Error {
    /// The schema document is invalid
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The validation engine rejected a node during binding
    #[error("Binding failed at {path}: {source}")]
    Binding {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// A node references a plugin namespace that was not prepared
    #[error("Plugin '{namespace}' required at {path} is not available")]
    PluginUnavailable { namespace: String, path: String },

    /// JSON text could not be parsed or produced
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a binding error for the node at `path`
    pub fn binding<P: Into<String>>(path: P, source: anyhow::Error) -> Self {
        Self::Binding {
            path: path.into(),
            source,
        }
    }

    /// Schema kind, if this error came from the document itself
    pub fn schema_kind(&self) -> Option<SchemaErrorKind> {
        match self {
            Self::Schema(err) => Some(err.kind()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
