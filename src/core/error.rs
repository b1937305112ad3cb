//! Error types for metadata operations
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Error types for metadata operations
#[derive(Debug, Error)]
pub enum MetaError {
    /// The dataset does not exist or its metadata cannot be read
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A document dictionary does not follow the encoding rules
    ///
    /// `path` is the `/`-joined key path of the offending entry.
    #[error("Schema error at '{path}': {message}")]
    Schema { path: String, message: String },

    /// The metadata source refused to store a document
    #[error("Sink rejected: {0}")]
    SinkRejected(String),

    /// Parse error (input XML is not well-formed)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The source cannot perform the requested operation
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Malformed element path
    #[error("Bad path: {0}")]
    BadPath(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl MetaError {
    /// Build a schema error for the entry at `path`
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        MetaError::Schema {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for metadata operations
pub type MetaResult<T> = Result<T, MetaError>;
