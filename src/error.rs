//! Error handling for nitrate QC operations.
//!
//! Provides error types with context for timestamp conversion, table
//! validation, and the polars operations behind resampling and flagging.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NitrateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Timestamp out of range: {value} {unit} cannot be represented as a UTC datetime")]
    TimestampOutOfRange { value: String, unit: &'static str },

    #[error("Date/time parsing failed for '{input}': {source}")]
    DateTimeParsing {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Required column '{column}' not found in table")]
    MissingColumn { column: String },

    #[error("Null timestamp at row {row}; every observation must carry a time")]
    NullTimestamp { row: usize },

    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl NitrateError {
    pub(crate) fn out_of_range(value: impl ToString, unit: &'static str) -> Self {
        Self::TimestampOutOfRange {
            value: value.to_string(),
            unit,
        }
    }

    pub(crate) fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NitrateError>;
