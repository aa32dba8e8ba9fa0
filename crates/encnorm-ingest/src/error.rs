//! Error types for reading raw encounter files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading raw rows or the ID-mapping file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    /// A column every raw row needs is missing from the header.
    #[error("required column '{column}' not found in {origin}")]
    MissingColumn { column: String, origin: String },

    #[error("{origin} line {line}: invalid {column} value '{value}'")]
    InvalidValue {
        origin: String,
        line: u64,
        column: String,
        value: String,
    },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    #[error("unexpected ID-mapping format in {path} at line {line}: {reason}")]
    MappingFormat {
        path: PathBuf,
        line: u64,
        reason: String,
    },
}

impl IngestError {
    pub(crate) fn open(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::FileRead { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
