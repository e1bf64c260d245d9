//! Writing cell values into existing packages with `XlsxPatcher`

use crate::{entry_text, temp_path, write_sample, write_with_calc_chain};
use pretty_assertions::assert_eq;
use sheetfill_core::{CellAddress, CellRange, CellValue};
use sheetfill_xlsx::{CellEdits, XlsxError, XlsxPatcher, XlsxReader};

fn addr(s: &str) -> CellAddress {
    CellAddress::parse(s).unwrap()
}

#[test]
fn test_patch_replaces_and_inserts() {
    let (dir, src) = temp_path("source.xlsx");
    write_sample(&src);
    let dst = dir.path().join("patched.xlsx");

    let mut edits = CellEdits::new();
    edits.set("Summary", addr("B2"), CellValue::Number(1234.0));
    edits.set("Summary", addr("C5"), CellValue::string("note"));
    edits.set("Data", addr("B3"), CellValue::Number(7.0));

    let report = XlsxPatcher::patch_file(&src, &dst, &edits).expect("patch");
    assert_eq!(report.replaced, 1);
    assert_eq!(report.inserted, 2);
    assert!(!report.dropped_calc_chain);

    let wb = XlsxReader::read_file(&dst).unwrap();
    let summary = wb.worksheet_by_name("Summary").unwrap();
    assert_eq!(summary.get_value("B2").unwrap(), CellValue::Number(1234.0));
    assert_eq!(summary.get_value("C5").unwrap(), CellValue::string("note"));
    assert_eq!(
        summary.get_value("A1").unwrap(),
        CellValue::string("Quarterly report")
    );
    assert_eq!(
        summary.merged_regions(),
        &[CellRange::parse("A1:B1").unwrap()]
    );
    assert_eq!(summary.row_height(0), Some(24.0));

    let data = wb.worksheet_by_name("Data").unwrap();
    assert_eq!(data.get_value("B3").unwrap(), CellValue::Number(7.0));
    assert_eq!(data.get_value("A2").unwrap(), CellValue::string("Widgets"));
}

#[test]
fn test_untouched_parts_are_copied_verbatim() {
    let (dir, src) = temp_path("source.xlsx");
    write_sample(&src);
    let dst = dir.path().join("patched.xlsx");

    let mut edits = CellEdits::new();
    edits.set("Summary", addr("B2"), CellValue::Number(1.0));
    XlsxPatcher::patch_file(&src, &dst, &edits).unwrap();

    for part in ["xl/styles.xml", "xl/workbook.xml", "xl/worksheets/sheet2.xml"] {
        assert_eq!(entry_text(&src, part), entry_text(&dst, part), "{part}");
    }
    assert_ne!(
        entry_text(&src, "xl/worksheets/sheet1.xml"),
        entry_text(&dst, "xl/worksheets/sheet1.xml")
    );
}

#[test]
fn test_patch_drops_calc_chain() {
    let (dir, src) = temp_path("calc.xlsx");
    write_with_calc_chain(&src);
    let dst = dir.path().join("patched.xlsx");

    let mut edits = CellEdits::new();
    edits.set("Calc", addr("B1"), CellValue::Number(99.0));

    let report = XlsxPatcher::patch_file(&src, &dst, &edits).unwrap();
    assert!(report.dropped_calc_chain);
    assert_eq!(report.replaced, 1);

    assert!(entry_text(&dst, "xl/calcChain.xml").is_none());
    let types = entry_text(&dst, "[Content_Types].xml").unwrap();
    assert!(!types.contains("calcChain"));
    let rels = entry_text(&dst, "xl/_rels/workbook.xml.rels").unwrap();
    assert!(!rels.contains("calcChain"));
    assert!(rels.contains("worksheets/sheet1.xml"));

    let wb = XlsxReader::read_file(&dst).unwrap();
    let ws = wb.worksheet_by_name("Calc").unwrap();
    let b1 = ws.get_value("B1").unwrap();
    assert!(!b1.is_formula());
    assert_eq!(b1, CellValue::Number(99.0));
    assert_eq!(ws.get_value("A1").unwrap(), CellValue::Number(2.0));
}

#[test]
fn test_calc_chain_kept_without_edits() {
    let (dir, src) = temp_path("calc.xlsx");
    write_with_calc_chain(&src);
    let dst = dir.path().join("copy.xlsx");

    let report = XlsxPatcher::patch_file(&src, &dst, &CellEdits::new()).unwrap();
    assert!(!report.dropped_calc_chain);
    assert!(entry_text(&dst, "xl/calcChain.xml").is_some());
}

#[test]
fn test_unknown_sheet() {
    let (dir, src) = temp_path("source.xlsx");
    write_sample(&src);
    let dst = dir.path().join("patched.xlsx");

    let mut edits = CellEdits::new();
    edits.set("Missing", addr("A1"), CellValue::Number(1.0));

    let err = XlsxPatcher::patch_file(&src, &dst, &edits).unwrap_err();
    assert!(matches!(err, XlsxError::UnknownSheet(ref name) if name == "Missing"), "got {err:?}");
}
