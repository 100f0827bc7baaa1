//! Error types for schema resolution, document fetching and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of a [`ResolveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document (or node) is not a usable schema.
    Schema,
    /// A scheme handler failed to produce a document.
    Io,
    /// No handler is registered for the URI scheme.
    UnsupportedScheme,
    /// The caller passed a reference the engine cannot interpret.
    Resolution,
}

/// Errors raised by scheme handlers while fetching a document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("URI does not denote a local path: {uri}")]
    NotALocalPath { uri: String },

    #[error("{message}")]
    Other { message: String },
}

impl FetchError {
    /// Build a free-form fetch failure, for handlers outside this crate.
    pub fn other(message: impl Into<String>) -> Self {
        FetchError::Other {
            message: message.into(),
        }
    }
}

/// Errors while locating the active schema.
#[derive(Debug, Error)]
pub enum ResolveError {
    // Schema errors (exit code 2)
    #[error("not a schema: {message}")]
    InvalidSchema { message: String },

    #[error("no match in schema {location} for path {pointer}")]
    PointerNotFound { location: String, pointer: String },

    #[error("invalid JSON Pointer \"{pointer}\": {message}")]
    InvalidPointer { pointer: String, message: String },

    // IO errors (exit code 3)
    #[error("cannot fetch {uri}: {source}")]
    Fetch {
        uri: String,
        #[source]
        source: FetchError,
    },

    #[error("no handler registered for scheme \"{scheme}\" (uri: {uri})")]
    UnsupportedScheme { scheme: String, uri: String },

    // Contract violations (exit code 2)
    #[error("invalid reference \"{reference}\": {message}")]
    InvalidReference { reference: String, message: String },
}

impl ResolveError {
    pub(crate) fn invalid_schema(message: impl Into<String>) -> Self {
        ResolveError::InvalidSchema {
            message: message.into(),
        }
    }

    /// Returns the broad category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::InvalidSchema { .. }
            | ResolveError::PointerNotFound { .. }
            | ResolveError::InvalidPointer { .. } => ErrorKind::Schema,
            ResolveError::Fetch { .. } => ErrorKind::Io,
            ResolveError::UnsupportedScheme { .. } => ErrorKind::UnsupportedScheme,
            ResolveError::InvalidReference { .. } => ErrorKind::Resolution,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Io => 3,
            _ => 2,
        }
    }
}

/// Errors during validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("dialect {dialect} is not supported by the validation backend")]
    UnsupportedDialect { dialect: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Resolve(e) => e.exit_code(),
            ValidateError::UnsupportedDialect { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}
