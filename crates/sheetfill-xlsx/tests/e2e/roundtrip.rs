//! Workbooks written by `XlsxWriter` read back unchanged

use crate::{sample_workbook, temp_path, write_sample};
use pretty_assertions::assert_eq;
use sheetfill_core::{
    BorderLineStyle, BorderStyle, CellRange, CellValue, HorizontalAlignment, Style, Workbook,
};
use sheetfill_xlsx::{XlsxError, XlsxReader, XlsxWriter};

#[test]
fn test_values_and_layout_survive() {
    let (_dir, path) = temp_path("sample.xlsx");
    write_sample(&path);

    let wb = XlsxReader::read_file(&path).expect("read back");
    assert_eq!(wb.sheet_names(), vec!["Summary", "Data"]);

    let summary = wb.worksheet_by_name("Summary").unwrap();
    assert_eq!(
        summary.get_value("A1").unwrap(),
        CellValue::string("Quarterly report")
    );
    assert_eq!(summary.get_value("B2").unwrap(), CellValue::Number(0.0));
    assert_eq!(
        summary.merged_regions(),
        &[CellRange::parse("A1:B1").unwrap()]
    );
    assert_eq!(summary.column_width(0), Some(20.0));
    assert_eq!(summary.row_height(0), Some(24.0));

    let data = wb.worksheet_by_name("Data").unwrap();
    assert_eq!(data.get_value("B2").unwrap(), CellValue::Number(12.5));
    assert_eq!(data.bounds(), CellRange::parse("A1:B2").unwrap());
}

#[test]
fn test_styles_survive() {
    let mut wb = Workbook::new();
    wb.add_worksheet_with_name("Styled").unwrap();
    let ws = wb.worksheet_mut(0).unwrap();

    let boxed = Style::new()
        .border(BorderStyle::all(BorderLineStyle::Thin))
        .horizontal_alignment(HorizontalAlignment::Center);
    ws.set_cell_value("A1", "Header").unwrap();
    ws.set_cell_style("A1", &boxed).unwrap();
    ws.set_cell_value("B1", "Bold").unwrap();
    ws.set_cell_style("B1", &Style::new().bold(true).font_name("Arial").font_size(9.0))
        .unwrap();
    ws.set_cell_value("C1", "Plain").unwrap();

    let (_dir, path) = temp_path("styled.xlsx");
    XlsxWriter::write_file(&wb, &path).unwrap();
    let back = XlsxReader::read_file(&path).unwrap();
    let ws = back.worksheet(0).unwrap();

    let a1 = ws.cell_style("A1").unwrap();
    assert!(a1.border.is_uniform(BorderLineStyle::Thin));
    assert_eq!(a1.alignment.horizontal, HorizontalAlignment::Center);

    let b1 = ws.cell_style("B1").unwrap();
    assert!(b1.font.bold);
    assert_eq!(b1.font.name.as_deref(), Some("Arial"));
    assert_eq!(b1.font.size, Some(9.0));

    let c1 = ws.cell_style("C1").unwrap();
    assert!(!c1.font.bold);
    assert!(c1.border.is_empty());
    assert!(c1.font.family_is("Calibri"));
    assert!(c1.font.size_is(11.0));
}

#[test]
fn test_escaped_text_and_sheet_names() {
    let mut wb = sample_workbook();
    wb.add_worksheet_with_name("R&D <draft>").unwrap();
    let ws = wb.worksheet_mut(2).unwrap();
    ws.set_cell_value("A1", "  padded & \"quoted\"  ").unwrap();

    let (_dir, path) = temp_path("escaped.xlsx");
    XlsxWriter::write_file(&wb, &path).unwrap();
    let back = XlsxReader::read_file(&path).unwrap();

    let ws = back.worksheet_by_name("R&D <draft>").expect("sheet name kept");
    assert_eq!(
        ws.get_value("A1").unwrap(),
        CellValue::string("  padded & \"quoted\"  ")
    );
}

#[test]
fn test_empty_workbook_is_rejected() {
    let (_dir, path) = temp_path("empty.xlsx");
    let err = XlsxWriter::write_file(&Workbook::new(), &path).unwrap_err();
    assert!(matches!(err, XlsxError::InvalidFormat(_)), "got {err:?}");
}

#[test]
fn test_not_a_zip() {
    let (_dir, path) = temp_path("bogus.xlsx");
    std::fs::write(&path, b"name,value\nx,1\n").unwrap();
    assert!(XlsxReader::read_file(&path).is_err());
}
