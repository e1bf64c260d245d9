//! Row counting and window partitioning

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ReconcileError, ReconcileResult};

static ROW_MARKER: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r#"id="row(\d+)""#));

/// Default number of rows per window
pub const DEFAULT_CHUNK_SIZE: u32 = 30;

/// A 1-based inclusive range of rows sent in one backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    /// 1-based position of the window in the run
    pub index: usize,
    pub start: u32,
    pub end: u32,
}

impl RowWindow {
    pub fn contains(&self, row: u32) -> bool {
        row >= self.start && row <= self.end
    }

    /// Rows covered, never zero
    pub fn row_count(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Largest `N` over the `id="row{N}"` markers of rendered markup
pub fn count_rows(markup: &str) -> ReconcileResult<u32> {
    let marker = ROW_MARKER
        .as_ref()
        .map_err(|e| ReconcileError::Pattern(e.clone()))?;
    Ok(marker
        .captures_iter(markup)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
        .unwrap_or(0))
}

/// Split rows `1..=total` into consecutive windows of at most `chunk_size`
pub fn partition(total: u32, chunk_size: u32) -> ReconcileResult<Vec<RowWindow>> {
    if chunk_size == 0 {
        return Err(ReconcileError::InvalidChunkSize);
    }

    let count = (u64::from(total) + u64::from(chunk_size) - 1) / u64::from(chunk_size);
    let mut windows = Vec::with_capacity(count as usize);
    let mut start = 1u32;
    while start <= total {
        let end = start.saturating_add(chunk_size - 1).min(total);
        windows.push(RowWindow {
            index: windows.len() + 1,
            start,
            end,
        });
        start = end + 1;
    }
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn bounds(windows: &[RowWindow]) -> Vec<(u32, u32)> {
        windows.iter().map(|w| (w.start, w.end)).collect()
    }

    #[test]
    fn test_count_rows_ignores_order() {
        let markup = r#"<th id="row3"></th><th id="col9"></th><th id="row12"></th><th id="row1"></th>"#;
        assert_eq!(count_rows(markup).unwrap(), 12);
        assert_eq!(count_rows("<p>Empty worksheet</p>").unwrap(), 0);
    }

    #[test]
    fn test_partition_65_by_30() {
        let windows = partition(65, 30).unwrap();
        assert_eq!(bounds(&windows), vec![(1, 30), (31, 60), (61, 65)]);
        assert_eq!(
            windows.iter().map(|w| w.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            windows.iter().map(RowWindow::row_count).collect::<Vec<_>>(),
            vec![30, 30, 5]
        );
    }

    #[test]
    fn test_partition_edges() {
        assert!(partition(0, 30).unwrap().is_empty());
        assert_eq!(bounds(&partition(30, 30).unwrap()), vec![(1, 30)]);
        assert_eq!(bounds(&partition(3, 1).unwrap()), vec![(1, 1), (2, 2), (3, 3)]);
        assert!(matches!(
            partition(10, 0),
            Err(ReconcileError::InvalidChunkSize)
        ));
    }

    proptest! {
        #[test]
        fn prop_partition_covers_each_row_once(total in 0u32..2_000, size in 1u32..200) {
            let windows = partition(total, size).unwrap();

            prop_assert_eq!(windows.len() as u32, (total + size - 1) / size);
            let mut next = 1;
            for w in &windows {
                prop_assert_eq!(w.start, next);
                prop_assert!(w.end >= w.start);
                prop_assert!(w.row_count() <= size);
                next = w.end + 1;
            }
            prop_assert_eq!(next, total + 1);
        }
    }
}
