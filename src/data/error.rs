//! Error types for data operations
//!
//! Provides unified error handling for dataset loading and settings.

use thiserror::Error;

// Re-export CSV limits from constants module for consistency
pub use crate::constants::{MAX_CSV_ROWS, MAX_CSV_SIZE_MB};

/// Errors that can occur while loading the incident dataset
#[derive(Error, Debug)]
pub enum DataError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error while reading a dataset file
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Required columns are absent from the header
    #[error("Schema error: missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A cell could not be coerced to its declared type.
    ///
    /// `row` is 1-based and counts data rows only (the header is not a row).
    #[error("Parse error at row {row}, column '{column}' (value {value:?}): {reason}")]
    Parse {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    /// File is too large for loading
    #[error("File too large: {size_mb}MB (max {max_mb}MB)")]
    TooLarge { size_mb: u64, max_mb: usize },

    /// Too many rows for loading
    #[error("Too many rows: {rows} (max {max_rows})")]
    TooManyRows { rows: usize, max_rows: usize },

    /// File is empty
    #[error("Empty file")]
    EmptyFile,

    /// Settings file could not be read or decoded
    #[error("Settings error: {0}")]
    Settings(String),
}

impl DataError {
    pub(crate) fn parse(
        row: usize,
        column: &str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        DataError::Parse {
            row,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the dataset's shape or content
    pub fn is_data_error(&self) -> bool {
        matches!(self, DataError::Schema { .. } | DataError::Parse { .. })
    }
}

/// Result type alias for data operations
pub type DataResult<T> = Result<T, DataError>;

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::Settings(e.to_string())
    }
}
