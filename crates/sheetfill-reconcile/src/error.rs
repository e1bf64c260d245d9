//! Error types for sheetfill-reconcile

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`ReconcileError`]
pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;

/// Errors that can occur while reconciling a rendered sheet
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Window size of zero
    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,

    /// None of the fallback encodings could decode a text file
    #[error("Could not decode {} with any supported encoding", .0.display())]
    Encoding(PathBuf),

    /// A built-in pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(regex::Error),

    /// The backend response held no usable JSON array
    #[error("No patch array in response: {0}")]
    Extract(String),

    /// The reasoning backend failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// Missing credentials for the reasoning backend
    #[error("No API key configured for the reasoning backend")]
    MissingApiKey,

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XLSX export error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] sheetfill_xlsx::XlsxError),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] sheetfill_csv::CsvError),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] sheetfill_core::Error),
}
