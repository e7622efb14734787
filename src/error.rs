//! Error types for car-insights.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a source file into a [`Dataset`](crate::data::model::Dataset).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("Invalid value '{value}' at row {row}, column {column}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Unsupported layout: {0}")]
    Format(String),
}

/// A requested aggregate has too few rows to be defined.
///
/// Recoverable: callers present "no data" instead of a number.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("not enough rows to aggregate: need {required}, view has {rows}")]
pub struct EmptyViewError {
    pub rows: usize,
    pub required: usize,
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    EmptyView(#[from] EmptyViewError),

    #[error("cannot read configuration {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
