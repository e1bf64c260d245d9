//! # sheetfill
//!
//! Fills spreadsheets from free-form source text.
//!
//! The pipeline has three stages:
//!
//! - render every worksheet to an HTML table that keeps merged-cell
//!   geometry and addresses rows and columns the way the sheet does
//! - reconcile each table against its source text in row windows through a
//!   [`ReasoningBackend`], producing a [`PatchSet`]
//! - apply the patches back to the original workbook, redirecting merged
//!   cells to their governing cell
//!
//! ## Example
//!
//! ```rust
//! use sheetfill::prelude::*;
//! use serde_json::json;
//!
//! let mut sheet = Worksheet::new("Summary");
//! sheet.set_cell_value("A1", "Revenue").unwrap();
//! sheet.merge_cells(&CellRange::parse("A1:B1").unwrap()).unwrap();
//!
//! let html = render(&sheet);
//! assert!(html.markup().contains(r#"colspan="2""#));
//!
//! let update = apply_to_worksheet(&mut sheet, &[json!({"cell_reference": "B1", "value": "1,234"})]).unwrap();
//! assert_eq!(update.redirected, 1);
//! assert_eq!(sheet.get_value("A1").unwrap(), CellValue::Number(1234.0));
//! ```

pub mod apply;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod prelude;

pub use apply::{
    apply, apply_file, apply_to_worksheet, coerce_value, load_patch_file, ApplyReport,
    SheetUpdate, UpdateStatus, WorkbookUpdate,
};
pub use error::{Error, Result};
pub use naming::{patch_stem, sanitize_sheet_name};
pub use pipeline::{
    apply_all, find_pairs, reconcile_all, render_all, run, Layout, RunReport, SourcePair,
    StageReport,
};

// Re-export core types
pub use sheetfill_core::{
    geometry, Alignment, BorderEdge, BorderLineStyle, BorderStyle, CellAddress, CellData,
    CellRange, CellValue, CoordinateMap, FontStyle, Geometry, HorizontalAlignment, Style,
    VerticalAlignment, Workbook, Worksheet, MAX_COLS, MAX_ROWS,
};

// Re-export rendering
pub use sheetfill_html::{classify, render, render_page, CellStyle, RenderedTable, StyleClass};

// Re-export reconciliation
pub use sheetfill_reconcile::{
    CellPatch, ChunkedReconciler, OpenAiBackend, OpenAiConfig, PatchSet, PatchValue,
    ReasoningBackend, ReconcileError, ReconcileOptions, ReconcileOutcome, WindowRequest,
};

// Re-export I/O types
pub use sheetfill_csv::{CsvError, CsvWriteOptions, CsvWriter};
pub use sheetfill_xlsx::{CellEdits, XlsxError, XlsxPatcher, XlsxReader, XlsxWriter};
