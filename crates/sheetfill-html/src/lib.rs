//! # sheetfill-html
//!
//! Renders worksheets as HTML tables whose `row{n}`/`col{n}` header ids
//! address every cell, so that text mentioning "row 7, column C" can be
//! mapped back to `C7`.
//!
//! ```rust
//! use sheetfill_core::Worksheet;
//! use sheetfill_html::render;
//!
//! let mut sheet = Worksheet::new("Summary");
//! sheet.set_cell_value("B2", 42.0).unwrap();
//!
//! let table = render(&sheet);
//! assert_eq!(table.row_count(), 2);
//! assert!(table.markup().contains(r#"<th id="row2""#));
//! assert!(table.markup().contains(">42</td>"));
//! ```

pub mod classify;
pub mod render;

pub use classify::{classify, inline_css, CellStyle, StyleClass, STYLE_RULES};
pub use render::{escape_html, render, render_page, RenderedTable, STYLESHEET};
