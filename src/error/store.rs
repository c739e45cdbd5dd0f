//! Record store error module.
//!
//! This module defines error types that may occur while validating, mutating
//! and persisting records.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during record store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error when a record is submitted without an identifier.
    #[error("Record identifier cannot be empty")]
    EmptyIdentifier,

    /// Error when a record is submitted without a display name.
    #[error("Record name cannot be empty")]
    EmptyName,

    /// Error when a score is not a finite number.
    #[error("Invalid score: {0}")]
    InvalidScore(String),

    /// Error when a field value cannot be written to the data file and read
    /// back unchanged.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// The offending field
        field: &'static str,
        /// What makes the value unusable
        reason: String,
    },

    /// Error when adding an identifier that is already stored.
    #[error("A record with identifier {0} already exists")]
    DuplicateIdentifier(String),

    /// Error when the requested identifier is not stored.
    #[error("Record with identifier {0} does not exist")]
    NotFound(String),

    /// Error when the data file cannot be read or written.
    #[error("Data file error at {path:?}: {source}")]
    Io {
        /// The data file involved
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Wraps an IO error with the path of the data file it concerns.
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for errors caused by the persistence layer rather than
    /// by the request itself.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
