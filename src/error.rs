//! Error types for MARC operations.
//!
//! This module provides the [`MarcError`] type for all MARC library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all MARC library operations.
///
/// Represents various error conditions that can occur during MARC record
/// parsing, formatting, streaming, or manipulation.
#[derive(Error, Debug)]
pub enum MarcError {
    /// Error indicating an unrecognized format selector.
    #[error("Unknown MARC format: {0}")]
    UnknownFormat(String),

    /// Error indicating an invalid or malformed MARC record.
    #[error("Invalid MARC record: {0}")]
    InvalidRecord(String),

    /// Error indicating an invalid field structure.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Error during parsing of MARC data.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error from compiling a tag pattern.
    #[error("Invalid tag pattern: {0}")]
    PatternError(#[from] regex::Error),

    /// Error from JSON serialization or deserialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
