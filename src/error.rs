//! Error handling for SeaBASS reading, timestamp reconstruction and writing.
//!
//! Structural defects in a file (malformed header, bad data rows) are always
//! fatal and carry the offending path and line. Informational defects are
//! not errors at all; they surface as [`crate::models::ParseWarning`]s.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeabassError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse header key/value pair in {path} at line {line}: '{content}'")]
    MalformedDirective {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Unable to parse /{directive} value '{value}' in {path} at line {line}")]
    InvalidSentinelValue {
        path: PathBuf,
        line: usize,
        directive: String,
        value: String,
    },

    #[error("Invalid delimiter '{value}' in {path} at line {line}")]
    InvalidDelimiter {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("No valid /delimiter detected in file: {path}")]
    MissingDelimiter { path: PathBuf },

    #[error("No valid /missing value detected in file: {path}")]
    MissingSentinel { path: PathBuf },

    #[error("No /fields detected in file: {path}")]
    MissingFields { path: PathBuf },

    #[error("No /end_header terminator found in file: {path}")]
    MissingHeaderTerminator { path: PathBuf },

    #[error(
        "Row in {path} at line {line} has {found} values but /fields declares {expected}"
    )]
    RowArityMismatch {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Data matrix is empty; no timestamps can be derived for file: {path}")]
    EmptyDataMatrix { path: PathBuf },

    #[error("{rule} fields not formatted correctly; unable to parse in file: {path} ({detail})")]
    TemporalParseFailure {
        rule: String,
        path: PathBuf,
        detail: String,
    },

    #[error("{rule} fields describe an invalid date/time in file: {path} ({detail})")]
    InvalidDateField {
        rule: String,
        path: PathBuf,
        detail: String,
    },

    #[error("Invalid day of year {day} for year {year} in file: {path}")]
    InvalidOrdinalDay { path: PathBuf, year: i32, day: i64 },

    #[error("Row index {row_index} cannot be addressed in file: {path}")]
    RowIndexOutOfRange { path: PathBuf, row_index: usize },

    #[error("Directory traversal failed under {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl SeabassError {
    /// Wrap an I/O failure with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from the header/data structure of the file
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MalformedDirective { .. }
                | Self::InvalidSentinelValue { .. }
                | Self::InvalidDelimiter { .. }
                | Self::MissingDelimiter { .. }
                | Self::MissingSentinel { .. }
                | Self::MissingFields { .. }
                | Self::MissingHeaderTerminator { .. }
                | Self::RowArityMismatch { .. }
        )
    }

    /// Whether the error was raised while deriving timestamps
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::EmptyDataMatrix { .. }
                | Self::TemporalParseFailure { .. }
                | Self::InvalidDateField { .. }
                | Self::InvalidOrdinalDay { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SeabassError>;
