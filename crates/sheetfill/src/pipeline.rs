//! Batch stages over a directory layout
//!
//! Each stage works file by file. A file that fails is logged and counted,
//! and the stage moves on; only a missing input directory stops a stage
//! before it starts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::apply::{apply_file, UpdateStatus, WorkbookUpdate};
use crate::error::{Error, Result};
use crate::naming::unique_stems;
use sheetfill_html::render_page;
use sheetfill_reconcile::{ChunkedReconciler, ReasoningBackend, ReconcileOptions};
use sheetfill_xlsx::XlsxReader;

/// Where each stage reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// `.xlsx` inbox
    pub workbooks: PathBuf,
    /// `.txt` sources, paired with markup by stem
    pub sources: PathBuf,
    /// Rendered `.html` pages
    pub markup: PathBuf,
    /// Reconciliation artifacts
    pub output: PathBuf,
    /// Patched copies of the workbooks
    pub updated: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self::under(Path::new(""))
    }
}

impl Layout {
    /// The default directory names under `root`
    pub fn under(root: &Path) -> Self {
        Self {
            workbooks: root.join("Input_Folder"),
            sources: root.join("DATA_SOURCES"),
            markup: root.join("html_outputs"),
            output: root.join("Output_folder"),
            updated: root.join("Updated_excel_workbooks"),
        }
    }
}

/// Markup page and the source text it is reconciled against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePair {
    pub markup: PathBuf,
    pub text: PathBuf,
}

/// Per-file counts for a stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl StageReport {
    /// At least one file went through
    pub fn passed(&self) -> bool {
        self.succeeded > 0
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Everything [`run`] did
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub rendered: Vec<PathBuf>,
    pub reconcile: StageReport,
    pub updates: Vec<WorkbookUpdate>,
}

fn require_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::MissingDirectory(dir.to_path_buf()))
    }
}

/// Files in `dir` with the given extension, sorted by name
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Render every worksheet of every workbook in the inbox to its own page.
///
/// Returns the pages written.
pub fn render_all(layout: &Layout) -> Result<Vec<PathBuf>> {
    require_dir(&layout.workbooks)?;
    fs::create_dir_all(&layout.markup)?;

    let workbooks = files_with_extension(&layout.workbooks, "xlsx")?;
    tracing::info!(count = workbooks.len(), dir = %layout.workbooks.display(), "rendering workbooks");

    let mut written = Vec::new();
    for path in &workbooks {
        match render_workbook(path, &layout.markup) {
            Ok(pages) => written.extend(pages),
            Err(e) => tracing::error!(workbook = %path.display(), error = %e, "could not render workbook"),
        }
    }
    Ok(written)
}

fn render_workbook(path: &Path, markup_dir: &Path) -> Result<Vec<PathBuf>> {
    let workbook = XlsxReader::read_file(path)?;
    let base = stem_of(path);
    let mut pages = Vec::new();
    for (name, stem) in unique_stems(&base, workbook.sheet_names()) {
        let Some(worksheet) = workbook.worksheet_by_name(name) else {
            continue;
        };
        let page = markup_dir.join(format!("{}.html", stem));
        fs::write(&page, render_page(worksheet, &base))?;
        tracing::info!(sheet = name, page = %page.display(), "rendered worksheet");
        pages.push(page);
    }
    Ok(pages)
}

/// Pair every page in the markup area with `{stem}.txt` in the sources area
pub fn find_pairs(layout: &Layout) -> Result<Vec<SourcePair>> {
    require_dir(&layout.markup)?;
    require_dir(&layout.sources)?;

    let mut pairs = Vec::new();
    for markup in files_with_extension(&layout.markup, "html")? {
        let text = layout.sources.join(format!("{}.txt", stem_of(&markup)));
        if text.is_file() {
            tracing::debug!(markup = %markup.display(), text = %text.display(), "paired");
            pairs.push(SourcePair { markup, text });
        } else {
            tracing::warn!(markup = %markup.display(), expected = %text.display(), "no source text for page, skipping");
        }
    }
    Ok(pairs)
}

/// Reconcile every pair and write the artifacts to the output area
pub fn reconcile_all<B: ReasoningBackend>(
    layout: &Layout,
    backend: B,
    options: ReconcileOptions,
) -> Result<StageReport> {
    let pairs = find_pairs(layout)?;
    fs::create_dir_all(&layout.output)?;
    tracing::info!(pairs = pairs.len(), "reconciling pages");

    let mut reconciler = ChunkedReconciler::new(backend, options);
    let mut report = StageReport::default();
    for pair in &pairs {
        match reconciler.reconcile_files(&pair.markup, &pair.text, &layout.output) {
            Ok((outcome, _)) if outcome.succeeded() => {
                tracing::info!(markup = %pair.markup.display(), patches = outcome.patches.len(), "reconciled");
                report.succeeded += 1;
            }
            Ok((outcome, _)) => {
                tracing::error!(markup = %pair.markup.display(), windows = outcome.windows.len(), "every window failed");
                report.failed += 1;
            }
            Err(e) => {
                tracing::error!(markup = %pair.markup.display(), error = %e, "could not reconcile");
                report.failed += 1;
            }
        }
    }

    if !report.passed() {
        tracing::error!(failed = report.failed, "no page was reconciled");
    }
    Ok(report)
}

/// Apply the output area's patch files to every workbook in the inbox
pub fn apply_all(layout: &Layout) -> Result<Vec<WorkbookUpdate>> {
    require_dir(&layout.workbooks)?;
    require_dir(&layout.output)?;

    let workbooks = files_with_extension(&layout.workbooks, "xlsx")?;
    tracing::info!(count = workbooks.len(), "applying patches");

    let updates: Vec<WorkbookUpdate> = workbooks
        .iter()
        .map(|path| {
            apply_file(path, &layout.output, &layout.updated).unwrap_or_else(|e| {
                tracing::error!(workbook = %path.display(), error = %e, "could not apply patches");
                WorkbookUpdate {
                    workbook: path.clone(),
                    status: UpdateStatus::Failed(e.to_string()),
                }
            })
        })
        .collect();

    if !updates.is_empty() && !updates.iter().any(|u| u.status.is_updated()) {
        tracing::error!(workbooks = updates.len(), "no workbook was updated");
    }
    Ok(updates)
}

/// Render, reconcile and apply in order
pub fn run<B: ReasoningBackend>(
    layout: &Layout,
    backend: B,
    options: ReconcileOptions,
) -> Result<RunReport> {
    let rendered = render_all(layout)?;
    let reconcile = reconcile_all(layout, backend, options)?;
    let updates = apply_all(layout)?;
    Ok(RunReport {
        rendered,
        reconcile,
        updates,
    })
}
