//! Error types for fold-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fold-core
#[derive(Debug, Error)]
pub enum Error {
    /// A declared key column is missing from one of the input datasets
    #[error("key column '{column}' is missing from the {dataset} dataset")]
    SchemaMismatch { column: String, dataset: String },

    /// The merge was called without any key columns
    #[error("at least one key column is required")]
    EmptyKeyColumns,

    /// A referenced column does not exist
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    /// A row-label lookup matched zero or more than one row
    #[error("row label '{label}' matched {matches} rows, expected exactly one")]
    AmbiguousRowLabel { label: String, matches: usize },

    /// No snapshot file found for a name
    #[error("no snapshot found for '{0}'")]
    SnapshotNotFound(String),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
