//! Durable outputs of a reconciliation run
//!
//! For a markup stem `report_Summary` the run writes `report_Summary.csv`,
//! `report_Summary.xlsx`, `report_Summary.json` and the human-readable
//! `report_Summary.txt`. Unparseable window responses are kept next to
//! them as `report_Summary_chunk_{k}.txt`.

use std::fs;
use std::path::{Path, PathBuf};

use sheetfill_core::{CellValue, Style, Workbook, Worksheet};
use sheetfill_csv::{CsvWriteOptions, CsvWriter};
use sheetfill_xlsx::XlsxWriter;

use crate::error::ReconcileResult;
use crate::patch::PatchSet;

/// Sheet name of the XLSX export
pub const MAPPING_SHEET: &str = "Cell_Mappings";

const COLUMNS: [&str; 6] = [
    "row",
    "column",
    "cell_reference",
    "value",
    "context",
    "source_file",
];

const MAX_COLUMN_WIDTH: usize = 50;

/// Locations of the artifacts for one stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub csv: PathBuf,
    pub xlsx: PathBuf,
    pub json: PathBuf,
    pub summary: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: &Path, stem: &str) -> Self {
        Self {
            csv: dir.join(format!("{}.csv", stem)),
            xlsx: dir.join(format!("{}.xlsx", stem)),
            json: dir.join(format!("{}.json", stem)),
            summary: dir.join(format!("{}.txt", stem)),
        }
    }

    /// Where the raw response of window `index` is kept
    pub fn chunk_response(dir: &Path, stem: &str, index: usize) -> PathBuf {
        dir.join(format!("{}_chunk_{}.txt", stem, index))
    }
}

/// Facts about the run shown in the summary
#[derive(Debug, Clone, Copy)]
pub struct RunInfo<'a> {
    pub markup_file: &'a str,
    pub text_file: &'a str,
    pub total_rows: u32,
    pub windows: usize,
}

/// The patch set as a table with a header row
pub fn mapping_sheet(patches: &PatchSet, source_file: &str) -> ReconcileResult<Worksheet> {
    let mut sheet = Worksheet::new(MAPPING_SHEET);
    let header = Style::new().bold(true);
    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.set_cell_value_at(0, col as u16, *name)?;
        sheet.set_cell_style_at(0, col as u16, &header)?;
    }

    for (i, patch) in patches.iter().enumerate() {
        let row = i as u32 + 1;
        let (display_row, column) = match patch.address() {
            Some(addr) => (
                CellValue::Number(f64::from(addr.display_row())),
                CellValue::String(addr.column_letters()),
            ),
            None => (CellValue::Empty, CellValue::Empty),
        };
        let value = patch
            .value
            .as_ref()
            .map(|v| v.to_cell_value())
            .unwrap_or_default();

        let cells = [
            display_row,
            column,
            CellValue::string(patch.cell_reference.as_str()),
            value,
            CellValue::string(patch.context_str()),
            CellValue::string(source_file),
        ];
        for (col, cell) in cells.into_iter().enumerate() {
            if !cell.is_empty() {
                sheet.set_cell_value_at(row, col as u16, cell)?;
            }
        }
    }

    for col in 0..COLUMNS.len() as u16 {
        let widest = (0..=patches.len() as u32)
            .map(|row| sheet.get_value_at(row, col).to_string().chars().count())
            .max()
            .unwrap_or(0);
        sheet.set_column_width(col, (widest + 2).min(MAX_COLUMN_WIDTH) as f64);
    }

    Ok(sheet)
}

/// Human-readable run summary
pub fn summary_text(patches: &PatchSet, info: &RunInfo<'_>, paths: &ArtifactPaths) -> String {
    let mut out = String::new();
    out.push_str(&format!("HTML File: {}\n", info.markup_file));
    out.push_str(&format!("Text File: {}\n", info.text_file));
    out.push_str(&format!("Total Rows Processed: {}\n", info.total_rows));
    out.push_str(&format!("Chunks Processed: {}\n", info.windows));
    out.push_str(&"=".repeat(80));
    out.push_str("\n\n");

    out.push_str(&format!("Found {} cells to fill:\n\n", patches.len()));
    for patch in patches {
        let value = patch
            .value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        out.push_str(&format!("Cell {}: {}\n", patch.cell_reference, value));
        out.push_str(&format!("  Context: {}\n\n", patch.context_str()));
    }

    out.push_str("\nFiles generated:\n");
    out.push_str(&format!("- {} (CSV for import)\n", file_name(&paths.csv)));
    out.push_str(&format!("- {} (Excel file)\n", file_name(&paths.xlsx)));
    out.push_str(&format!("- {} (JSON data)\n", file_name(&paths.json)));
    out
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Write all four artifacts for `stem` into `dir`
pub fn persist(
    dir: &Path,
    stem: &str,
    patches: &PatchSet,
    info: &RunInfo<'_>,
) -> ReconcileResult<ArtifactPaths> {
    fs::create_dir_all(dir)?;
    let paths = ArtifactPaths::new(dir, stem);

    let sheet = mapping_sheet(patches, stem)?;
    CsvWriter::write_file(&sheet, &paths.csv, &CsvWriteOptions::default())?;

    let mut workbook = Workbook::new();
    workbook.push_worksheet(sheet)?;
    if let Err(e) = XlsxWriter::write_file(&workbook, &paths.xlsx) {
        tracing::warn!(path = %paths.xlsx.display(), error = %e, "could not write XLSX export, CSV export is still available");
    }

    fs::write(&paths.json, patches.to_json_pretty()?)?;
    fs::write(&paths.summary, summary_text(patches, info, &paths))?;

    tracing::debug!(stem, patches = patches.len(), "artifacts written");
    Ok(paths)
}

/// Keep an unparseable response for inspection
pub fn save_raw_response(
    dir: &Path,
    stem: &str,
    index: usize,
    response: &str,
) -> ReconcileResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = ArtifactPaths::chunk_response(dir, stem, index);
    fs::write(&path, response)?;
    Ok(path)
}
