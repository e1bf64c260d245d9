//! Style pool for deduplication

use super::Style;
use ahash::AHashMap;

/// Deduplicating store of cell styles
///
/// Cells hold a `u32` index into the pool. Index 0 is always the default
/// style.
#[derive(Debug, Clone)]
pub struct StylePool {
    styles: Vec<Style>,
    lookup: AHashMap<Style, u32>,
}

impl StylePool {
    /// Create a pool holding only the default style
    pub fn new() -> Self {
        let mut lookup = AHashMap::with_capacity(16);
        lookup.insert(Style::default(), 0);
        Self {
            styles: vec![Style::default()],
            lookup,
        }
    }

    /// Return the index of `style`, adding it if not yet present
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&idx) = self.lookup.get(&style) {
            return idx;
        }
        let idx = self.styles.len() as u32;
        self.lookup.insert(style.clone(), idx);
        self.styles.push(style);
        idx
    }

    /// Replace the style at index 0.
    ///
    /// Workbooks carry their own default cell format; cells without an
    /// explicit style resolve to it.
    pub fn set_default(&mut self, style: Style) {
        if self.styles[0] == style {
            return;
        }
        let previous = std::mem::replace(&mut self.styles[0], style.clone());
        if self.lookup.get(&previous) == Some(&0) {
            self.lookup.remove(&previous);
        }
        self.lookup.insert(style, 0);
    }

    /// Get a style by index
    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Style at `index`, or the default style for an unknown index
    pub fn resolve(&self, index: u32) -> &Style {
        self.get(index).unwrap_or(&self.styles[0])
    }

    /// Number of distinct styles, default included
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// True when only the default style is present
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }

    /// Iterate over all styles with their indices
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Style)> {
        self.styles.iter().enumerate().map(|(i, s)| (i as u32, s))
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BorderLineStyle, BorderStyle};

    #[test]
    fn test_default_at_zero() {
        let pool = StylePool::new();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(0), Some(&Style::default()));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_deduplication() {
        let mut pool = StylePool::new();
        let a = pool.get_or_insert(Style::new().font_size(9.0));
        let b = pool.get_or_insert(Style::new().font_size(9.0));
        let c = pool.get_or_insert(Style::new().border(BorderStyle::all(BorderLineStyle::Thin)));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get_or_insert(Style::default()), 0);
    }

    #[test]
    fn test_set_default() {
        let mut pool = StylePool::new();
        let calibri = Style::new().font_name("Calibri").font_size(11.0);
        pool.set_default(calibri.clone());
        assert_eq!(pool.resolve(0), &calibri);
        assert_eq!(pool.get_or_insert(calibri), 0);
        assert_eq!(pool.get_or_insert(Style::default()), 1);
    }

    #[test]
    fn test_resolve_unknown_index() {
        let pool = StylePool::new();
        assert_eq!(pool.resolve(42), &Style::default());
    }
}
