//! Prelude module - common imports for sheetfill users
//!
//! ```rust
//! use sheetfill::prelude::*;
//! ```

pub use crate::{
    // Applying
    apply_to_worksheet,
    // Cell types
    CellAddress,
    CellPatch,
    CellRange,
    CellValue,
    // Reconciling
    ChunkedReconciler,
    // Error types
    Error,
    // Pipeline
    Layout,
    PatchSet,
    ReasoningBackend,
    ReconcileOptions,
    Result,
    Style,
    // Main types
    Workbook,
    Worksheet,
    // I/O types
    XlsxPatcher,
    XlsxReader,
    XlsxWriter,
    // Rendering
    render,
    render_page,
};
