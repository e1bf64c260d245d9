//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")
//! - [`CellData`] - Complete cell data including value and style

mod address;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use value::{format_number, CellValue};

/// A stored cell: its value plus an index into the worksheet's style pool
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellData {
    /// Cell value
    pub value: CellValue,
    /// Index into the owning worksheet's [`StylePool`](crate::StylePool), 0 = default
    pub style_index: u32,
}

impl CellData {
    /// Create a cell holding a value with the default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }
}
