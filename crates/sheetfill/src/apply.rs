//! Writing reconciled patches back into workbooks
//!
//! Patch files are read leniently: each entry is checked on its own and a
//! bad entry is skipped with a warning. References inside a merged region
//! are redirected to the region's top-left cell before writing.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::naming::unique_stems;
use sheetfill_core::{geometry, CellAddress, CellValue, Workbook, Worksheet};
use sheetfill_xlsx::{CellEdits, XlsxPatcher, XlsxReader};

static REFERENCE_SHAPE: Lazy<std::result::Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+[0-9]+$"));

/// Load a patch file: a single object or an array of objects
pub fn load_patch_file(path: &Path) -> Result<Vec<Value>> {
    let text = fs::read_to_string(path)?;
    match serde_json::from_str(&text)? {
        Value::Array(items) => Ok(items),
        obj @ Value::Object(_) => Ok(vec![obj]),
        _ => Err(Error::PatchShape(path.to_path_buf())),
    }
}

/// Convert a patch value into what gets written to the cell.
///
/// Text has its commas removed; all digits becomes an integer, otherwise a
/// float if it parses, otherwise the original text is kept. Returns `None`
/// for a missing, null or empty value and for arrays or objects.
pub fn coerce_value(value: &Value) -> Option<CellValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(CellValue::Boolean(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(|i| CellValue::Number(i as f64))
            .or_else(|| n.as_f64().map(CellValue::Number)),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(coerce_text(s)),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_text(text: &str) -> CellValue {
    let clean = text.replace(',', "");
    if !clean.is_empty() && clean.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = clean.parse::<i64>() {
            return CellValue::Number(n as f64);
        }
    }
    match clean.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::String(text.to_string()),
    }
}

/// Outcome of applying one sheet's patches
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetUpdate {
    pub sheet: String,
    /// Successful writes, including repeated writes to one cell
    pub applied: usize,
    /// Writes redirected from a merged cell to its governing cell
    pub redirected: usize,
    pub skipped: usize,
    /// Final value per written cell
    pub edits: BTreeMap<CellAddress, CellValue>,
}

/// Apply patch entries to a worksheet held in memory
pub fn apply_to_worksheet(worksheet: &mut Worksheet, entries: &[Value]) -> Result<SheetUpdate> {
    let shape = REFERENCE_SHAPE
        .as_ref()
        .map_err(|e| Error::Pattern(e.clone()))?;
    let governing = geometry::governing_map(worksheet);
    let bounds = worksheet.bounds();
    let sheet = worksheet.name().to_string();
    let mut update = SheetUpdate {
        sheet: sheet.clone(),
        ..SheetUpdate::default()
    };

    for (i, entry) in entries.iter().enumerate() {
        let raw_ref = entry.get("cell_reference");
        let value = entry.get("value").and_then(coerce_value);
        let (Some(raw_ref), Some(value)) = (raw_ref.filter(|r| !is_falsy(r)), value) else {
            tracing::warn!(sheet = %sheet, index = i, entry = %entry, "skipping incomplete patch");
            update.skipped += 1;
            continue;
        };

        let reference = match raw_ref.as_str().map(str::trim) {
            Some(r) if r.len() >= 2 && shape.is_match(r) => r,
            _ => {
                tracing::warn!(sheet = %sheet, index = i, reference = %raw_ref, "skipping invalid cell reference");
                update.skipped += 1;
                continue;
            }
        };

        let addr = match CellAddress::parse(reference) {
            Ok(addr) if bounds.contains(&addr) => addr,
            Ok(_) => {
                tracing::warn!(sheet = %sheet, reference, bounds = %bounds, "skipping reference outside the sheet");
                update.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(sheet = %sheet, reference, error = %e, "skipping unparseable cell reference");
                update.skipped += 1;
                continue;
            }
        };

        let target = governing.resolve(addr);
        if target != addr {
            tracing::info!(sheet = %sheet, from = %addr, to = %target, "redirecting merged cell to its governing cell");
            update.redirected += 1;
        }

        worksheet.set_cell_value_at(target.row, target.col, value.clone())?;
        tracing::debug!(sheet = %sheet, cell = %target, value = %value, "updated cell");
        update.edits.insert(target, value);
        update.applied += 1;
    }

    Ok(update)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Patches applied across a workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub sheets: Vec<SheetUpdate>,
}

impl ApplyReport {
    pub fn total_applied(&self) -> usize {
        self.sheets.iter().map(|s| s.applied).sum()
    }

    /// At least one cell was written
    pub fn is_updated(&self) -> bool {
        self.total_applied() > 0
    }

    /// Writes to carry into the package on disk
    pub fn cell_edits(&self) -> CellEdits {
        let mut edits = CellEdits::new();
        for sheet in &self.sheets {
            for (addr, value) in &sheet.edits {
                edits.set(sheet.sheet.as_str(), *addr, value.clone());
            }
        }
        edits
    }
}

/// Apply patch sets keyed by sheet name to a workbook held in memory.
///
/// Sets naming a sheet the workbook does not have are skipped.
pub fn apply(workbook: &mut Workbook, patch_sets: &BTreeMap<String, Vec<Value>>) -> Result<ApplyReport> {
    let mut report = ApplyReport::default();
    for (name, entries) in patch_sets {
        let Some(worksheet) = workbook.worksheet_by_name_mut(name) else {
            tracing::warn!(sheet = %name, "patch set names a sheet the workbook does not have");
            continue;
        };
        let update = apply_to_worksheet(worksheet, entries)?;
        tracing::info!(sheet = %name, applied = update.applied, skipped = update.skipped, "sheet updated");
        report.sheets.push(update);
    }
    Ok(report)
}

/// What happened to one workbook in the apply stage
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateStatus {
    Updated {
        output: PathBuf,
        sheets: usize,
        cells: usize,
    },
    /// No sheet received an update
    Skipped,
    Failed(String),
}

impl UpdateStatus {
    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateStatus::Updated { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookUpdate {
    pub workbook: PathBuf,
    pub status: UpdateStatus,
}

/// Match a workbook's sheets to patch files in `patch_dir` and, when any
/// cell was written, save the patched package under `updated_dir` with the
/// same file name.
pub fn apply_file(workbook_path: &Path, patch_dir: &Path, updated_dir: &Path) -> Result<WorkbookUpdate> {
    let mut workbook = XlsxReader::read_file(workbook_path)?;
    let base = workbook_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut patch_sets = BTreeMap::new();
    let names: Vec<String> = workbook.sheet_names().into_iter().map(String::from).collect();
    for (name, stem) in unique_stems(&base, names.iter().map(String::as_str)) {
        let json_path = patch_dir.join(format!("{}.json", stem));
        if !json_path.exists() {
            tracing::debug!(sheet = name, expected = %json_path.display(), "no patch file for sheet");
            continue;
        }
        match load_patch_file(&json_path) {
            Ok(entries) => {
                tracing::info!(sheet = name, file = %json_path.display(), entries = entries.len(), "found patch file");
                patch_sets.insert(name.to_string(), entries);
            }
            Err(e) => {
                tracing::warn!(file = %json_path.display(), error = %e, "could not load patch file");
            }
        }
    }

    let report = apply(&mut workbook, &patch_sets)?;
    if !report.is_updated() {
        tracing::info!(workbook = %workbook_path.display(), "no updates, workbook not saved");
        return Ok(WorkbookUpdate {
            workbook: workbook_path.to_path_buf(),
            status: UpdateStatus::Skipped,
        });
    }

    fs::create_dir_all(updated_dir)?;
    let output = updated_dir.join(workbook_path.file_name().unwrap_or_default());
    let patched = XlsxPatcher::patch_file(workbook_path, &output, &report.cell_edits())?;
    tracing::info!(
        output = %output.display(),
        cells = report.total_applied(),
        replaced = patched.replaced,
        inserted = patched.inserted,
        "saved updated workbook"
    );

    Ok(WorkbookUpdate {
        workbook: workbook_path.to_path_buf(),
        status: UpdateStatus::Updated {
            output,
            sheets: report.sheets.iter().filter(|s| s.applied > 0).count(),
            cells: report.total_applied(),
        },
    })
}
