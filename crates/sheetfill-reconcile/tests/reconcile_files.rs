//! File-level reconciliation with a scripted backend

use std::collections::VecDeque;
use std::fs;

use pretty_assertions::assert_eq;
use sheetfill_reconcile::{
    CellPatch, ChunkedReconciler, PatchValue, ReasoningBackend, ReconcileOptions,
    ReconcileResult, WindowRequest,
};
use sheetfill_xlsx::XlsxReader;

struct Scripted {
    responses: VecDeque<String>,
    prompts_saw_text: Vec<bool>,
}

impl Scripted {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|r| r.to_string()).collect(),
            prompts_saw_text: Vec::new(),
        }
    }
}

impl ReasoningBackend for Scripted {
    fn propose(&mut self, request: &WindowRequest<'_>) -> ReconcileResult<String> {
        self.prompts_saw_text
            .push(request.source_text == "Revenue for Q1 was 1,234.");
        Ok(self.responses.pop_front().unwrap_or_else(|| "[]".into()))
    }
}

fn markup(rows: u32) -> String {
    let mut out = String::from("<table>\n");
    for r in 1..=rows {
        out.push_str(&format!("<tr><th id=\"row{}\">{}</th><td id=\"B{}\"></td></tr>\n", r, r, r));
    }
    out.push_str("</table>");
    out
}

#[test]
fn test_artifacts_written_for_partial_success() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("Report_Summary.html");
    let text = dir.path().join("Report.txt");
    fs::write(&html, markup(4)).unwrap();
    fs::write(&text, b"  Revenue for Q1 was 1,234.\n").unwrap();
    let out = dir.path().join("out");

    let mut reconciler = ChunkedReconciler::new(
        Scripted::new(&[
            r#"[{"cell_reference": "b1", "value": "1,234", "context": "Q1 revenue"}]"#,
            "no idea, sorry",
        ]),
        ReconcileOptions { chunk_size: 2 },
    );
    let (outcome, paths) = reconciler.reconcile_files(&html, &text, &out).unwrap();
    let paths = paths.expect("artifacts");

    assert_eq!(outcome.total_rows, 4);
    assert_eq!(outcome.windows.len(), 2);
    assert_eq!(reconciler.backend().prompts_saw_text, vec![true, true]);

    let json = fs::read_to_string(&paths.json).unwrap();
    let patches: Vec<CellPatch> = serde_json::from_str(&json).unwrap();
    assert_eq!(
        patches,
        vec![CellPatch::new("B1", PatchValue::Text("1,234".into())).with_context("Q1 revenue")]
    );

    let csv = fs::read_to_string(&paths.csv).unwrap();
    assert_eq!(
        csv.lines().next(),
        Some("row,column,cell_reference,value,context,source_file")
    );
    assert_eq!(
        csv.lines().nth(1),
        Some("1,B,B1,\"1,234\",Q1 revenue,Report_Summary")
    );

    let workbook = XlsxReader::read_file(&paths.xlsx).unwrap();
    assert_eq!(workbook.sheet_count(), 1);

    let summary = fs::read_to_string(&paths.summary).unwrap();
    assert!(summary.contains("Report_Summary.html"));
    assert!(summary.contains("Report.txt"));

    let raw = out.join("Report_Summary_chunk_2.txt");
    assert_eq!(fs::read_to_string(raw).unwrap(), "no idea, sorry");
}

#[test]
fn test_nothing_persisted_when_every_window_fails() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("Sheet.html");
    let text = dir.path().join("Sheet.txt");
    fs::write(&html, markup(3)).unwrap();
    fs::write(&text, "context").unwrap();
    let out = dir.path().join("out");

    let mut reconciler = ChunkedReconciler::new(
        Scripted::new(&["nope"]),
        ReconcileOptions::default(),
    );
    let (outcome, paths) = reconciler.reconcile_files(&html, &text, &out).unwrap();

    assert!(!outcome.succeeded());
    assert!(paths.is_none());
    assert!(!out.join("Sheet.json").exists());
    assert!(out.join("Sheet_chunk_1.txt").exists());
}

#[test]
fn test_empty_sheet_skips_backend() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("Empty.html");
    let text = dir.path().join("Empty.txt");
    fs::write(&html, "<p>Empty worksheet</p>").unwrap();
    fs::write(&text, "anything").unwrap();

    let mut reconciler =
        ChunkedReconciler::new(Scripted::new(&[]), ReconcileOptions::default());
    let (outcome, paths) = reconciler
        .reconcile_files(&html, &text, &dir.path().join("out"))
        .unwrap();

    assert!(outcome.succeeded());
    assert!(paths.is_none());
    assert!(reconciler.backend().prompts_saw_text.is_empty());
}
