//! Errors
//!
//! Custom error types used throughout the `driftscope` crate.
use crate::data::{ColumnType, Source};
use thiserror::Error;

/// Errors that can occur while loading datasets or detecting drift.
#[derive(Debug, Error)]
pub enum DriftError {
    /// The reference and observed datasets do not expose the same column names.
    #[error(
        "Column sets differ, missing from observed: [{}], not present in reference: [{}].",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    /// A column is numeric in one dataset and categorical in the other.
    #[error("Column {column} is {reference} in the reference data but {observed} in the observed data.")]
    ColumnTypeMismatch {
        column: String,
        reference: ColumnType,
        observed: ColumnType,
    },
    /// A column holds no non-missing values in one of the datasets.
    #[error("Column {column} has no values in the {dataset} dataset.")]
    EmptyColumn { column: String, dataset: Source },
    /// A chart could not be drawn or encoded.
    #[error("Unable to render chart for {feature}: {reason}")]
    RenderFailure { feature: String, reason: String },
    /// The statistics backend failed for a reason other than an undefined test.
    #[error("Statistical computation failed: {0}")]
    Statistics(String),
    /// The same column name appears twice in a dataset.
    #[error("Column {0} appears more than once.")]
    DuplicateColumn(String),
    /// Columns of a dataset have different lengths.
    #[error("Column {column} has {actual} rows, expected {expected}.")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    /// Unable to read a dataset, config, or report.
    #[error("Unable to read from source: {0}")]
    UnableToRead(String),
    /// Unable to write a config or report.
    #[error("Unable to write to file: {0}")]
    UnableToWrite(String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// The worker pool could not be created.
    #[error("Unable to build thread pool: {0}")]
    ThreadPool(String),
}
