//! Line codec for the flat data file.
//!
//! One record per line, fields in the fixed order identifier, name, category,
//! score, separated by a single delimiter character.

use super::record::Record;
use crate::error::StoreError;

/// Column names, in file order.
const COLUMNS: [&str; 4] = ["id", "name", "category", "score"];

/// Layout of a data file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
    /// Field separator
    pub delimiter: char,

    /// Marker introducing a comment line
    pub comment_prefix: String,

    /// Decimals written for the score
    pub score_precision: usize,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            delimiter: ';',
            comment_prefix: "#".to_string(),
            score_precision: 2,
        }
    }
}

/// Parses one line of the data file.
///
/// Returns `None` for lines that must be skipped: blank lines, comments, lines
/// with the wrong number of fields, an empty identifier, or a score that is
/// not a finite number.
pub fn parse_line(line: &str, format: &LineFormat) -> Option<Record> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(format.comment_prefix.as_str()) {
        return None;
    }

    let fields: Vec<&str> = line.split(format.delimiter).collect();
    let [id, name, category, score] = fields.as_slice() else {
        return None;
    };
    if id.is_empty() {
        return None;
    }

    let score: f64 = score.trim().parse().ok()?;
    if !score.is_finite() {
        return None;
    }

    Some(Record::new(*id, *name, *category, score))
}

/// Formats a record as one data file line, without the line terminator.
pub fn format_line(record: &Record, format: &LineFormat) -> String {
    let d = format.delimiter;
    format!(
        "{id}{d}{name}{d}{category}{d}{score:.prec$}",
        id = record.id,
        name = record.name,
        category = record.category,
        score = record.score,
        prec = format.score_precision,
    )
}

/// Checks that `record` is written by [`format_line`] in a form that
/// [`parse_line`] reads back unchanged.
///
/// # Errors
///
/// `InvalidField` when the identifier is padded with whitespace or starts with
/// the comment marker, or when any text field holds the delimiter or a line
/// break.
pub fn check_record(record: &Record, format: &LineFormat) -> Result<(), StoreError> {
    let invalid = |field, reason: String| StoreError::InvalidField { field, reason };

    if record.id != record.id.trim() {
        return Err(invalid(
            "identifier",
            "cannot start or end with whitespace".to_string(),
        ));
    }
    if record.id.starts_with(format.comment_prefix.as_str()) {
        return Err(invalid(
            "identifier",
            format!("cannot start with the comment marker {:?}", format.comment_prefix),
        ));
    }

    let fields = [
        ("identifier", &record.id),
        ("name", &record.name),
        ("category", &record.category),
    ];
    for (field, value) in fields {
        if value.contains(format.delimiter) {
            return Err(invalid(
                field,
                format!("cannot contain the delimiter {:?}", format.delimiter),
            ));
        }
        if value.contains(['\n', '\r']) {
            return Err(invalid(field, "cannot contain a line break".to_string()));
        }
    }
    Ok(())
}

/// Commented header naming the columns.
pub fn header_line(format: &LineFormat) -> String {
    let separator = format.delimiter.to_string();
    format!("{} {}", format.comment_prefix, COLUMNS.join(separator.as_str()))
}
