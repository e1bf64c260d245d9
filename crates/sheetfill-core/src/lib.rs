//! # sheetfill-core
//!
//! Workbook model shared by the sheetfill crates.
//!
//! - [`CellValue`], [`CellAddress`] and [`CellRange`] for cells and A1 addressing
//! - [`Style`] with the font, border and alignment attributes used for rendering
//! - [`Workbook`] and [`Worksheet`]
//! - [`geometry`] for merged-cell spans, the governing-cell map and pixel sizes
//!
//! ## Example
//!
//! ```rust
//! use sheetfill_core::{geometry, CellAddress, CellRange, Worksheet};
//!
//! let mut sheet = Worksheet::new("Summary");
//! sheet.set_cell_value("A1", "Total").unwrap();
//! sheet.merge_cells(&CellRange::parse("A1:B1").unwrap()).unwrap();
//!
//! let map = geometry::governing_map(&sheet);
//! let b1 = CellAddress::parse("B1").unwrap();
//! assert_eq!(map.resolve(b1).to_string(), "A1");
//! ```

pub mod cell;
pub mod error;
pub mod geometry;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{format_number, CellAddress, CellData, CellRange, CellValue};
pub use error::{Error, Result};
pub use geometry::{CellRole, CoordinateMap, Geometry, Span};
pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, FontStyle, HorizontalAlignment, Style,
    StylePool, VerticalAlignment,
};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
