//! Windowed dispatch and merge

use std::path::Path;

use crate::artifacts::{self, ArtifactPaths, RunInfo};
use crate::backend::{ReasoningBackend, WindowRequest};
use crate::error::{ReconcileError, ReconcileResult};
use crate::extract::extract_patches;
use crate::patch::{PatchSet, PatchValue};
use crate::text::read_text;
use crate::window::{count_rows, partition, RowWindow, DEFAULT_CHUNK_SIZE};

/// Reconciliation settings
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Rows per backend call
    pub chunk_size: u32,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// How one window went
#[derive(Debug, Clone, PartialEq)]
pub enum WindowStatus {
    /// The response parsed; counts of patches kept and dropped
    Parsed { accepted: usize, dropped: usize },
    /// The call failed or the response held no patch array
    Failed {
        reason: String,
        /// Response body, when one was received
        response: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowOutcome {
    pub window: RowWindow,
    pub status: WindowStatus,
}

/// Result of reconciling one rendered sheet
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    pub total_rows: u32,
    pub windows: Vec<WindowOutcome>,
    pub patches: PatchSet,
}

impl ReconcileOutcome {
    /// At least one window parsed, or there was nothing to do
    pub fn succeeded(&self) -> bool {
        self.total_rows == 0 || self.parsed_windows() > 0
    }

    pub fn parsed_windows(&self) -> usize {
        self.windows
            .iter()
            .filter(|w| matches!(w.status, WindowStatus::Parsed { .. }))
            .count()
    }

    pub fn failed_windows(&self) -> usize {
        self.windows.len() - self.parsed_windows()
    }
}

/// Sends a sheet to a [`ReasoningBackend`] in row windows and merges the
/// proposed patches into one [`PatchSet`]
pub struct ChunkedReconciler<B> {
    backend: B,
    options: ReconcileOptions,
}

impl<B: ReasoningBackend> ChunkedReconciler<B> {
    pub fn new(backend: B, options: ReconcileOptions) -> Self {
        Self { backend, options }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Reconcile markup against source text.
    ///
    /// Windows are dispatched in row order. A window whose call fails or
    /// whose response cannot be parsed contributes nothing; the others
    /// still run. Patches outside the requesting window, or with a
    /// reference that does not parse, are dropped.
    pub fn reconcile(&mut self, markup: &str, source_text: &str) -> ReconcileResult<ReconcileOutcome> {
        if self.options.chunk_size == 0 {
            return Err(ReconcileError::InvalidChunkSize);
        }

        let total_rows = count_rows(markup)?;
        let mut outcome = ReconcileOutcome {
            total_rows,
            ..ReconcileOutcome::default()
        };
        if total_rows == 0 {
            tracing::info!("no row markers in markup, nothing to reconcile");
            return Ok(outcome);
        }

        let windows = partition(total_rows, self.options.chunk_size)?;
        tracing::info!(total_rows, windows = windows.len(), chunk_size = self.options.chunk_size, "reconciling");

        for window in windows {
            let request = WindowRequest {
                markup,
                source_text,
                window,
            };
            let status = self.run_window(&request, &mut outcome.patches);
            outcome.windows.push(WindowOutcome { window, status });
        }

        tracing::info!(
            patches = outcome.patches.len(),
            parsed = outcome.parsed_windows(),
            failed = outcome.failed_windows(),
            "reconciliation finished"
        );
        Ok(outcome)
    }

    fn run_window(&mut self, request: &WindowRequest<'_>, patches: &mut PatchSet) -> WindowStatus {
        let window = request.window;
        tracing::debug!(window = window.index, start = window.start, end = window.end, "dispatching window");

        let response = match self.backend.propose(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(window = window.index, error = %e, "backend call failed");
                return WindowStatus::Failed {
                    reason: e.to_string(),
                    response: None,
                };
            }
        };

        let proposed = match extract_patches(&response) {
            Ok(proposed) => proposed,
            Err(e) => {
                tracing::warn!(window = window.index, error = %e, "could not parse window response");
                return WindowStatus::Failed {
                    reason: e.to_string(),
                    response: Some(response),
                };
            }
        };

        let mut accepted = 0;
        let mut dropped = 0;
        for patch in proposed {
            let Some(addr) = patch.address() else {
                tracing::warn!(window = window.index, reference = %patch.cell_reference, "dropping patch with unparseable reference");
                dropped += 1;
                continue;
            };
            if !window.contains(addr.display_row()) {
                tracing::warn!(
                    window = window.index,
                    reference = %patch.cell_reference,
                    start = window.start,
                    end = window.end,
                    "dropping patch outside its window"
                );
                dropped += 1;
                continue;
            }
            if patch.value.as_ref().map_or(true, PatchValue::is_blank) {
                tracing::warn!(window = window.index, reference = %patch.cell_reference, "dropping patch without a value");
                dropped += 1;
                continue;
            }
            if patches.insert(patch) {
                accepted += 1;
            }
        }

        tracing::debug!(window = window.index, accepted, dropped, "window merged");
        WindowStatus::Parsed { accepted, dropped }
    }

    /// Reconcile one markup file against its text source and persist the
    /// artifacts under `output_dir`, named after the markup file's stem.
    ///
    /// Artifacts are written when at least one window parsed. Raw responses
    /// of windows that could not be parsed are kept as chunk files.
    pub fn reconcile_files(
        &mut self,
        markup_path: &Path,
        text_path: &Path,
        output_dir: &Path,
    ) -> ReconcileResult<(ReconcileOutcome, Option<ArtifactPaths>)> {
        let (markup, _) = read_text(markup_path)?;
        let (text, _) = read_text(text_path)?;
        let stem = markup_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let outcome = self.reconcile(&markup, text.trim())?;

        for window in &outcome.windows {
            if let WindowStatus::Failed {
                response: Some(raw), ..
            } = &window.status
            {
                let path = artifacts::save_raw_response(output_dir, &stem, window.window.index, raw)?;
                tracing::info!(path = %path.display(), "kept unparseable response");
            }
        }

        if outcome.parsed_windows() == 0 {
            return Ok((outcome, None));
        }

        let markup_file = file_name(markup_path);
        let text_file = file_name(text_path);
        let info = RunInfo {
            markup_file: &markup_file,
            text_file: &text_file,
            total_rows: outcome.total_rows,
            windows: outcome.windows.len(),
        };
        let paths = artifacts::persist(output_dir, &stem, &outcome.patches, &info)?;
        Ok((outcome, Some(paths)))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
