//! Cell patches and the deduplicated patch set

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sheetfill_core::{format_number, CellAddress, CellValue};

/// A JSON scalar proposed for a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatchValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl PatchValue {
    /// The value as it would be stored in a cell, without coercion
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            PatchValue::Bool(b) => CellValue::Boolean(*b),
            PatchValue::Integer(n) => CellValue::Number(*n as f64),
            PatchValue::Float(n) => CellValue::Number(*n),
            PatchValue::Text(s) => CellValue::String(s.clone()),
        }
    }

    /// True for an empty string
    pub fn is_blank(&self) -> bool {
        matches!(self, PatchValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for PatchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchValue::Bool(b) => write!(f, "{}", b),
            PatchValue::Integer(n) => write!(f, "{}", n),
            PatchValue::Float(n) => write!(f, "{}", format_number(*n)),
            PatchValue::Text(s) => f.write_str(s),
        }
    }
}

/// One proposed cell write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellPatch {
    /// A1-style reference, e.g. `B7`
    pub cell_reference: String,
    #[serde(default)]
    pub value: Option<PatchValue>,
    /// Why the value belongs in the cell
    #[serde(default)]
    pub context: Option<String>,
}

impl CellPatch {
    pub fn new<R: Into<String>>(cell_reference: R, value: PatchValue) -> Self {
        Self {
            cell_reference: cell_reference.into(),
            value: Some(value),
            context: None,
        }
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Deduplication key: trimmed, upper-cased reference
    pub fn key(&self) -> String {
        self.cell_reference.trim().to_ascii_uppercase()
    }

    /// Parsed reference, if it is a valid A1 address
    pub fn address(&self) -> Option<CellAddress> {
        CellAddress::parse(&self.cell_reference).ok()
    }

    pub fn context_str(&self) -> &str {
        self.context.as_deref().unwrap_or("")
    }
}

/// Patches in arrival order, one per cell reference
///
/// The first patch for a reference is kept; later ones are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchSet {
    patches: Vec<CellPatch>,
    seen: HashSet<String>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a patch unless its reference is already present.
    ///
    /// The stored reference is normalized to upper case. Returns whether
    /// the patch was added.
    pub fn insert(&mut self, mut patch: CellPatch) -> bool {
        let key = patch.key();
        if !self.seen.insert(key.clone()) {
            return false;
        }
        patch.cell_reference = key;
        self.patches.push(patch);
        true
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CellPatch> {
        self.patches.iter()
    }

    pub fn as_slice(&self) -> &[CellPatch] {
        &self.patches
    }

    pub fn into_vec(self) -> Vec<CellPatch> {
        self.patches
    }

    /// Pretty-printed JSON array, non-ASCII kept as is
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.patches)
    }
}

impl Extend<CellPatch> for PatchSet {
    fn extend<I: IntoIterator<Item = CellPatch>>(&mut self, iter: I) {
        for patch in iter {
            self.insert(patch);
        }
    }
}

impl FromIterator<CellPatch> for PatchSet {
    fn from_iter<I: IntoIterator<Item = CellPatch>>(iter: I) -> Self {
        let mut set = PatchSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a PatchSet {
    type Item = &'a CellPatch;
    type IntoIter = std::slice::Iter<'a, CellPatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_shapes() {
        let patches: Vec<CellPatch> = serde_json::from_str(
            r#"[
                {"cell_reference": "A1", "value": 1234, "context": "int"},
                {"cell_reference": "A2", "value": 12.5},
                {"cell_reference": "A3", "value": "N/A", "context": null},
                {"cell_reference": "A4", "value": true},
                {"cell_reference": "A5", "value": null},
                {"cell_reference": "A6"}
            ]"#,
        )
        .unwrap();

        let values: Vec<Option<PatchValue>> = patches.iter().map(|p| p.value.clone()).collect();
        assert_eq!(
            values,
            vec![
                Some(PatchValue::Integer(1234)),
                Some(PatchValue::Float(12.5)),
                Some(PatchValue::Text("N/A".into())),
                Some(PatchValue::Bool(true)),
                None,
                None,
            ]
        );
        assert_eq!(patches[0].context_str(), "int");
        assert_eq!(patches[2].context_str(), "");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut set = PatchSet::new();
        assert!(set.insert(CellPatch::new("b7", PatchValue::Integer(1))));
        assert!(!set.insert(CellPatch::new("B7", PatchValue::Integer(2))));
        assert!(set.insert(CellPatch::new(" C1 ", PatchValue::Text("x".into()))));

        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].cell_reference, "B7");
        assert_eq!(set.as_slice()[0].value, Some(PatchValue::Integer(1)));
        assert_eq!(set.as_slice()[1].cell_reference, "C1");
    }

    #[test]
    fn test_json_keeps_non_ascii() {
        let set: PatchSet = vec![CellPatch::new("A1", PatchValue::Text("Zürich €".into()))
            .with_context("city")]
        .into_iter()
        .collect();
        let json = set.to_json_pretty().unwrap();
        assert!(json.contains("Zürich €"));
        assert!(json.contains("\"cell_reference\": \"A1\""));
        assert!(json.contains("\"context\": \"city\""));
    }

    #[test]
    fn test_display() {
        assert_eq!(PatchValue::Float(3.0).to_string(), "3");
        assert_eq!(PatchValue::Float(0.25).to_string(), "0.25");
        assert_eq!(PatchValue::Bool(false).to_string(), "false");
    }
}
