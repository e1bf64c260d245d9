//! Merged-cell geometry and pixel sizing
//!
//! [`resolve`] turns a worksheet's merged regions and size overrides into
//! the facts a table renderer needs. [`governing_map`] is the same merge
//! information viewed from the write side: every covered coordinate maps to
//! the top-left cell of its region.

use std::collections::{BTreeMap, BTreeSet};

use crate::cell::CellAddress;
use crate::worksheet::Worksheet;

/// Pixels per character unit of column width
pub const PX_PER_WIDTH_UNIT: f64 = 7.0;

/// Pixels per point of row height
pub const PX_PER_HEIGHT_POINT: f64 = 1.33;

/// Row height used when a row has no explicit height
pub const DEFAULT_ROW_HEIGHT: &str = "18px";

/// Span of a governing cell; a `None` axis spans a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub colspan: Option<u16>,
    pub rowspan: Option<u32>,
}

/// How a coordinate takes part in rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    /// Top-left cell of a merged region spanning more than one cell
    Governing(Span),
    /// Covered by a merged region but not its top-left cell
    Hidden,
    /// Everything else
    Ordinary,
}

/// Rendering geometry of a worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    /// Governing cells and their spans
    pub spans: BTreeMap<CellAddress, Span>,
    /// Coordinates suppressed by a merge
    pub hidden: BTreeSet<CellAddress>,
    /// Column widths as CSS pixel strings
    pub column_widths: BTreeMap<u16, String>,
    /// Row heights as CSS pixel strings
    pub row_heights: BTreeMap<u32, String>,
}

impl Geometry {
    /// Role of a coordinate. Every coordinate has exactly one.
    pub fn classify(&self, addr: &CellAddress) -> CellRole {
        if let Some(span) = self.spans.get(addr) {
            CellRole::Governing(*span)
        } else if self.hidden.contains(addr) {
            CellRole::Hidden
        } else {
            CellRole::Ordinary
        }
    }

    /// CSS width of a column, if the sheet sets one
    pub fn column_width(&self, col: u16) -> Option<&str> {
        self.column_widths.get(&col).map(String::as_str)
    }

    /// CSS height of a row, if the sheet sets one
    pub fn row_height(&self, row: u32) -> Option<&str> {
        self.row_heights.get(&row).map(String::as_str)
    }
}

/// Compute spans, hidden coordinates and pixel sizes for a worksheet
pub fn resolve(worksheet: &Worksheet) -> Geometry {
    let mut geometry = Geometry::default();

    for range in worksheet.merged_regions() {
        let cols = range.col_count();
        let rows = range.row_count();
        let span = Span {
            colspan: (cols > 1).then_some(cols),
            rowspan: (rows > 1).then_some(rows),
        };
        if span.colspan.is_some() || span.rowspan.is_some() {
            geometry.spans.insert(range.top_left(), span);
        }
        geometry
            .hidden
            .extend(range.cells().filter(|a| *a != range.top_left()));
    }

    for (&col, &width) in worksheet.column_widths() {
        if width > 0.0 {
            geometry
                .column_widths
                .insert(col, to_px(width * PX_PER_WIDTH_UNIT));
        }
    }
    for (&row, &height) in worksheet.row_heights() {
        if height > 0.0 {
            geometry
                .row_heights
                .insert(row, to_px(height * PX_PER_HEIGHT_POINT));
        }
    }

    geometry
}

fn to_px(value: f64) -> String {
    format!("{}px", value.trunc() as i64)
}

/// Map from covered coordinate to the governing coordinate of its region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateMap {
    entries: BTreeMap<CellAddress, CellAddress>,
}

impl CoordinateMap {
    /// Governing coordinate for `addr`; `addr` itself when it is not merged
    pub fn resolve(&self, addr: CellAddress) -> CellAddress {
        self.entries.get(&addr).copied().unwrap_or(addr)
    }

    /// True when `addr` is covered by a merge but is not its top-left cell
    pub fn is_subordinate(&self, addr: &CellAddress) -> bool {
        self.entries.get(addr).map_or(false, |g| g != addr)
    }

    /// Number of covered coordinates, governing cells included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the sheet has no merged regions
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the governing-cell map of a worksheet
pub fn governing_map(worksheet: &Worksheet) -> CoordinateMap {
    let mut entries = BTreeMap::new();
    for range in worksheet.merged_regions() {
        let top_left = range.top_left();
        for addr in range.cells() {
            entries.insert(addr, top_left);
        }
    }
    CoordinateMap { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellRange;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    fn sheet_with_merges(ranges: &[&str]) -> Worksheet {
        let mut ws = Worksheet::new("Test");
        for r in ranges {
            ws.merge_cells(&CellRange::parse(r).unwrap()).unwrap();
        }
        ws
    }

    #[test]
    fn test_every_coordinate_has_one_role() {
        let ws = sheet_with_merges(&["A1:B1", "C3:D5", "F1:F1"]);
        let geometry = resolve(&ws);

        let mut governing = 0;
        let mut hidden = 0;
        for a in CellRange::parse("A1:G6").unwrap().cells() {
            let in_spans = geometry.spans.contains_key(&a);
            let in_hidden = geometry.hidden.contains(&a);
            assert!(!(in_spans && in_hidden), "{} in two roles", a);
            match geometry.classify(&a) {
                CellRole::Governing(_) => governing += 1,
                CellRole::Hidden => hidden += 1,
                CellRole::Ordinary => assert!(!in_spans && !in_hidden),
            }
        }
        assert_eq!(governing, 2);
        assert_eq!(hidden, 1 + 5);
    }

    #[test]
    fn test_spans() {
        let ws = sheet_with_merges(&["A1:B1", "C3:C4"]);
        let geometry = resolve(&ws);
        assert_eq!(
            geometry.classify(&addr("A1")),
            CellRole::Governing(Span {
                colspan: Some(2),
                rowspan: None
            })
        );
        assert_eq!(
            geometry.classify(&addr("C3")),
            CellRole::Governing(Span {
                colspan: None,
                rowspan: Some(2)
            })
        );
        assert_eq!(geometry.classify(&addr("B1")), CellRole::Hidden);
        assert_eq!(geometry.classify(&addr("C4")), CellRole::Hidden);
        assert_eq!(geometry.classify(&addr("D1")), CellRole::Ordinary);
    }

    #[test]
    fn test_single_cell_merge_is_ordinary() {
        let geometry = resolve(&sheet_with_merges(&["B2"]));
        assert_eq!(geometry.classify(&addr("B2")), CellRole::Ordinary);
        assert!(geometry.hidden.is_empty());
    }

    #[test]
    fn test_pixel_sizes() {
        let mut ws = Worksheet::new("Test");
        ws.set_column_width(0, 10.0);
        ws.set_column_width(1, 8.43);
        ws.set_column_width(2, 0.0);
        ws.set_row_height(0, 15.0);
        ws.set_row_height(1, 30.0);

        let geometry = resolve(&ws);
        assert_eq!(geometry.column_width(0), Some("70px"));
        assert_eq!(geometry.column_width(1), Some("59px"));
        assert_eq!(geometry.column_width(2), None);
        assert_eq!(geometry.row_height(0), Some("19px"));
        assert_eq!(geometry.row_height(1), Some("39px"));
        assert_eq!(geometry.row_height(2), None);
    }

    #[test]
    fn test_governing_map() {
        let ws = sheet_with_merges(&["A1:B2"]);
        let map = governing_map(&ws);
        assert_eq!(map.len(), 4);
        assert_eq!(map.resolve(addr("B2")), addr("A1"));
        assert_eq!(map.resolve(addr("A1")), addr("A1"));
        assert_eq!(map.resolve(addr("C1")), addr("C1"));
        assert!(map.is_subordinate(&addr("B1")));
        assert!(!map.is_subordinate(&addr("A1")));
        assert!(!map.is_subordinate(&addr("C1")));
    }
}
