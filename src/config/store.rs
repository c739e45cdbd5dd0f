//! Store configuration module.
//!
//! This module defines where records are persisted and how each line of the
//! data file is laid out.

use super::ConfigResult;
use super::Validate;
use crate::error::config::ConfigError;
use crate::store::codec::LineFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest number of decimals accepted for the score column.
const MAX_SCORE_PRECISION: usize = 10;

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the flat data file
    pub data_file: PathBuf,

    /// Single character separating the fields of a line
    pub delimiter: String,

    /// Lines starting with this marker are ignored on load
    pub comment_prefix: String,

    /// Whether to write a commented header line on save
    pub write_header: bool,

    /// Number of decimals written for the score column
    pub score_precision: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("students.csv"),
            delimiter: ";".to_string(),
            comment_prefix: "#".to_string(),
            write_header: true,
            score_precision: 2,
        }
    }
}

impl StoreConfig {
    /// Line layout described by this configuration.
    ///
    /// Expects a validated configuration; an empty delimiter falls back to `;`.
    pub fn line_format(&self) -> LineFormat {
        LineFormat {
            delimiter: self.delimiter.chars().next().unwrap_or(';'),
            comment_prefix: self.comment_prefix.clone(),
            score_precision: self.score_precision,
        }
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "data_file cannot be empty".to_string(),
            ));
        }

        let mut chars = self.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some('\n' | '\r'), None) => {
                return Err(ConfigError::ValidationError(
                    "delimiter cannot be a line break".to_string(),
                ))
            }
            (Some(_), None) => {}
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "delimiter must be exactly one character, got {:?}",
                    self.delimiter
                )))
            }
        }

        if self.comment_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "comment_prefix cannot be empty".to_string(),
            ));
        }

        if self.comment_prefix != self.comment_prefix.trim() {
            return Err(ConfigError::ValidationError(
                "comment_prefix cannot start or end with whitespace".to_string(),
            ));
        }

        if self.comment_prefix.contains(self.delimiter.as_str()) {
            return Err(ConfigError::ValidationError(
                "comment_prefix cannot contain the delimiter".to_string(),
            ));
        }

        if self.score_precision > MAX_SCORE_PRECISION {
            return Err(ConfigError::ValueOutOfRange {
                key: "score_precision".to_string(),
                message: format!("must be at most {MAX_SCORE_PRECISION}"),
            });
        }

        Ok(())
    }
}
