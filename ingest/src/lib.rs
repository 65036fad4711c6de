pub mod parser;
pub mod record;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("companion file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse result rows of {path}")]
    Tabular {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("row {row} of {path} has {found} columns, expected at least {expected}")]
    ColumnCount {
        path: PathBuf,
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("malformed options blob in {path}")]
    MalformedOptions {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("option {key} missing from {path}")]
    MissingOption { key: &'static str, path: PathBuf },
    #[error("option {key} in {path} has an unsupported shape")]
    UnsupportedOption { key: String, path: PathBuf },
}
