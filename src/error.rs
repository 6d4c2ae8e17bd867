// src/error.rs

use arrow::datatypes::DataType;
use thiserror::Error;

/// Contract errors raised by the pipeline.
///
/// Network unreachability is deliberately absent: an ineffective URL is
/// reported as `Ok(false)` / `Ok(None)`, never as an error.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("specified url must start with `http://` or `https://`: {0}")]
    InvalidScheme(String),

    #[error("specified column must be a Utf8 array, got {0}")]
    NotText(DataType),

    #[error("cannot parse year from {raw:?} (row {row})")]
    ParseYear { row: usize, raw: Option<String> },

    #[error("cannot parse quantity from {raw:?} (row {row})")]
    ParseQuantity { row: usize, raw: String },

    #[error("spreadsheet has {found} columns but the catalogue defines {expected}")]
    ColumnCount { expected: usize, found: usize },

    #[error("spreadsheet contains no worksheet data")]
    EmptyWorkbook,

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown partition {partition} for category {category}")]
    UnknownPartition { category: String, partition: String },

    #[error("invalid catalogue entry {category}: {reason}")]
    InvalidCatalogue { category: String, reason: String },

    #[error("dataset not found: {0}")]
    DatasetNotFound(String),
}
