//! Common error types for the updateinfo crates.

use std::path::PathBuf;
use thiserror::Error;

/// Common error type for updateinfo operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read updateinfo file '{}': {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("decoding token: {0}")]
    Xml(String),

    #[error("decoding element \"{element}\": {reason}")]
    Decode { element: String, reason: String },

    #[error("failed parsing date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("invalid URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("failed reading packages file '{}': {source}", .path.display())]
    PackagesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using common Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an error raised while decoding the named element.
    pub fn decode(element: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Error::Decode {
            element: element.into(),
            reason: err.to_string(),
        }
    }

    /// Whether this error comes from a malformed input document.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Error::Xml(_) | Error::Decode { .. } | Error::InvalidUrl { .. }
        )
    }

    /// Whether this error was raised while building filter or output configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::Template(_)
                | Error::PackagesFile { .. }
                | Error::InvalidDate { .. }
        )
    }
}
