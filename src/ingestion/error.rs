//! Error types for the cleaning and import pipelines.
//!
//! - [`LoadError`] - the input CSV could not be turned into a table
//! - [`TransformError`] - a cleaning stage refused to run on its input
//!
//! Job-level plumbing (config, save, database) uses `anyhow` with context.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a CSV into a record table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Missing file, unreadable file, or invalid UTF-8.
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The header row is empty.
    #[error("No header row found in {0:?}")]
    EmptyHeader(PathBuf),

    /// A data row has more fields than the header.
    #[error("Line {line}: expected at most {expected} fields, found {found}")]
    RowTooLong {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// Errors raised by a cleaning stage before it touches the table.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A row does not have one cell per header column.
    #[error("Row {row} has {found} cells, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A targeted column name appears more than once in the header.
    #[error("Column '{0}' appears more than once")]
    AmbiguousColumn(String),
}
