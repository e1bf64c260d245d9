//! Error types for sheetfill

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the apply step and the batch pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// A directory the stage needs does not exist
    #[error("Directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// A patch file is neither a JSON object nor an array of objects
    #[error("Patch file {} must hold an object or an array of objects", .0.display())]
    PatchShape(PathBuf),

    /// Pattern compilation error
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] sheetfill_core::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] sheetfill_xlsx::XlsxError),

    #[error("Reconcile error: {0}")]
    Reconcile(#[from] sheetfill_reconcile::ReconcileError),
}
