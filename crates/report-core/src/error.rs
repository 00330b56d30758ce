use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the cluster report.
///
/// Only input-level failures are represented here. Absent or oddly shaped
/// fields inside a document never surface as errors; they are defaulted at the
/// point of access (see [`crate::fields`]).
#[derive(Error, Debug)]
pub enum ReportError {
    /// A required diagnostics document was not supplied.
    #[error("Required file not found: {0}")]
    MissingInput(String),

    /// A required diagnostics document could not be parsed as JSON.
    #[error("Invalid JSON in file {document}: {source}")]
    InvalidContent {
        document: String,
        #[source]
        source: serde_json::Error,
    },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The processed report does not have the shape the renderer expects.
    #[error("Invalid report structure: {0}")]
    InvalidReport(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be serialized or parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;
