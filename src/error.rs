//! Error types for RIS operations.
//!
//! This module provides the [`RisError`] type for all library operations
//! and the [`Result`] convenience type.
//!
//! Irregular lines are never an error: a line that does not match the tag
//! grammar is read as a continuation of the field above it.

use thiserror::Error;

/// Error type for all RIS library operations.
#[derive(Error, Debug)]
pub enum RisError {
    /// The input ended in the middle of an entry (no `ER` line) and the
    /// reader runs in strict recovery mode.
    #[error("Unterminated entry: {0}")]
    UnterminatedEntry(String),

    /// A line insertion would have moved the end marker off the last line.
    #[error("Invalid insert: {0}")]
    InvalidInsert(String),

    /// The file lookup collaborator could not answer (transport,
    /// authentication, or an incomplete search). Always fatal for a run.
    #[error("Lookup unavailable: {0}")]
    LookupUnavailable(String),

    /// A lookup manifest could not be parsed.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error related to character encoding conversion.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`RisError`].
pub type Result<T> = std::result::Result<T, RisError>;
