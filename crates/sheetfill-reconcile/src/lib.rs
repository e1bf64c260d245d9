//! # sheetfill-reconcile
//!
//! Reconciles a rendered worksheet against free-form source text. The
//! rendered rows are split into windows, each window is sent to a
//! [`ReasoningBackend`], and the cell patches it proposes are merged in
//! row order.
//!
//! ```
//! use sheetfill_reconcile::{ChunkedReconciler, ReconcileOptions, ReasoningBackend, WindowRequest, ReconcileResult};
//!
//! struct Fixed;
//!
//! impl ReasoningBackend for Fixed {
//!     fn propose(&mut self, _: &WindowRequest<'_>) -> ReconcileResult<String> {
//!         Ok(r#"[{"cell_reference": "B1", "value": 42}]"#.to_string())
//!     }
//! }
//!
//! let markup = r#"<th id="row1">1</th>"#;
//! let mut reconciler = ChunkedReconciler::new(Fixed, ReconcileOptions::default());
//! let outcome = reconciler.reconcile(markup, "revenue was 42").unwrap();
//! assert_eq!(outcome.patches.len(), 1);
//! ```

pub mod artifacts;
pub mod backend;
pub mod error;
pub mod extract;
pub mod openai;
pub mod patch;
pub mod reconciler;
pub mod text;
pub mod window;

pub use artifacts::{persist, ArtifactPaths, RunInfo};
pub use backend::{build_prompt, ReasoningBackend, WindowRequest};
pub use error::{ReconcileError, ReconcileResult};
pub use extract::extract_patches;
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use patch::{CellPatch, PatchSet, PatchValue};
pub use reconciler::{
    ChunkedReconciler, ReconcileOptions, ReconcileOutcome, WindowOutcome, WindowStatus,
};
pub use text::read_text;
pub use window::{count_rows, partition, RowWindow, DEFAULT_CHUNK_SIZE};
