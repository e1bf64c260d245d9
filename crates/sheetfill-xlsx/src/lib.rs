//! # sheetfill-xlsx
//!
//! XLSX (Office Open XML) support for sheetfill:
//!
//! - [`XlsxReader`] loads values, styles, merged regions and sizes into a
//!   [`Workbook`](sheetfill_core::Workbook)
//! - [`XlsxWriter`] serializes a workbook into a fresh package
//! - [`XlsxPatcher`] writes individual cell values into an existing package,
//!   leaving every part it does not need to touch byte-for-byte intact

pub mod error;
pub mod package;
pub mod patcher;
pub mod reader;
pub mod writer;

mod styles;
mod xml;

pub use error::{XlsxError, XlsxResult};
pub use package::SheetPart;
pub use patcher::{CellEdits, PatchReport, XlsxPatcher};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
