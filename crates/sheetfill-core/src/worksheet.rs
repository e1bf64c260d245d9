//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellRange, CellValue};
use crate::error::{Error, Result};
use crate::style::{Style, StylePool};
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
///
/// Cells are stored sparsely, keyed by 0-based `(row, col)`. Styles are
/// deduplicated through a per-sheet [`StylePool`].
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u16), CellData>,
    styles: StylePool,
    merged: Vec<CellRange>,
    column_widths: BTreeMap<u16, f64>,
    row_heights: BTreeMap<u32, f64>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            styles: StylePool::new(),
            merged: Vec::new(),
            column_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Cell Access ===

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(&(row, col))
    }

    /// Get cell value by address string
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cell_at(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Style of a cell; the default style for absent cells
    pub fn cell_style_at(&self, row: u32, col: u16) -> &Style {
        let idx = self.cell_at(row, col).map_or(0, |c| c.style_index);
        self.styles.resolve(idx)
    }

    /// Style of a cell by address
    pub fn cell_style(&self, address: &str) -> Result<&Style> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_style_at(addr.row, addr.col))
    }

    /// Style of cells that carry no explicit style
    pub fn set_default_style(&mut self, style: Style) {
        self.styles.set_default(style);
    }

    /// The sheet's style pool
    pub fn style_pool(&self) -> &StylePool {
        &self.styles
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices, keeping its style
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.entry((row, col)).or_default().value = value.into();
        Ok(())
    }

    /// Set a cell style by address string
    pub fn set_cell_style(&mut self, address: &str, style: &Style) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    /// Set a cell style by row and column indices, keeping its value
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        self.validate_cell_position(row, col)?;
        let idx = self.styles.get_or_insert(style.clone());
        self.cells.entry((row, col)).or_default().style_index = idx;
        Ok(())
    }

    // === Dimensions ===

    /// Row height in points, if set
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    /// Set row height in points
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    /// Column width in character units, if set
    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    /// Set column width in character units
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// All explicit row heights
    pub fn row_heights(&self) -> &BTreeMap<u32, f64> {
        &self.row_heights
    }

    /// All explicit column widths
    pub fn column_widths(&self) -> &BTreeMap<u16, f64> {
        &self.column_widths
    }

    /// Bounding rectangle from A1.
    ///
    /// Covers every stored cell (styled empty cells included) and every
    /// merged region. An empty sheet reports the single cell A1.
    pub fn bounds(&self) -> CellRange {
        let mut max_row = 0u32;
        let mut max_col = 0u16;

        for &(row, col) in self.cells.keys() {
            max_row = max_row.max(row);
            max_col = max_col.max(col);
        }
        for range in &self.merged {
            max_row = max_row.max(range.end.row);
            max_col = max_col.max(range.end.col);
        }

        CellRange::from_indices(0, 0, max_row, max_col)
    }

    /// Check whether a cell lies within [`bounds`](Self::bounds)
    pub fn in_bounds(&self, addr: &CellAddress) -> bool {
        self.bounds().contains(addr)
    }

    // === Merged Cells ===

    /// Merged regions in insertion order
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged
    }

    /// Merge a range of cells
    ///
    /// Fails if the range overlaps an existing merged region. Single-cell
    /// ranges are accepted and have no effect on rendering.
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if let Some(existing) = self.merged.iter().find(|m| m.overlaps(range)) {
            return Err(Error::MergeOverlap {
                new: range.to_a1_string(),
                existing: existing.to_a1_string(),
            });
        }
        self.validate_cell_position(range.end.row, range.end.col)?;
        self.merged.push(*range);
        Ok(())
    }

    /// Merged region containing a cell, if any
    pub fn merged_region_at(&self, addr: &CellAddress) -> Option<&CellRange> {
        self.merged.iter().find(|m| m.contains(addr))
    }

    // === Utility ===

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }
        Ok(())
    }

    /// Check if the worksheet stores no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellAddress, &CellData)> {
        self.cells
            .iter()
            .map(|(&(row, col), data)| (CellAddress::new(row, col), data))
    }
}
