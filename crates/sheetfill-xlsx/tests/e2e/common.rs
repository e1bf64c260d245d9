//! Shared fixture helpers

use std::io::Write;
use std::path::{Path, PathBuf};

use sheetfill_core::{CellRange, Workbook};
use sheetfill_xlsx::XlsxWriter;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Temp directory plus a path inside it
pub fn temp_path(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    (dir, path)
}

/// Two sheets: "Summary" with a merged header and "Data" with a few rows
pub fn sample_workbook() -> Workbook {
    let mut wb = Workbook::new();
    wb.add_worksheet_with_name("Summary").unwrap();
    wb.add_worksheet_with_name("Data").unwrap();

    let summary = wb.worksheet_mut(0).unwrap();
    summary.set_cell_value("A1", "Quarterly report").unwrap();
    summary.merge_cells(&CellRange::parse("A1:B1").unwrap()).unwrap();
    summary.set_cell_value("A2", "Total").unwrap();
    summary.set_cell_value("B2", 0.0).unwrap();
    summary.set_column_width(0, 20.0);
    summary.set_row_height(0, 24.0);

    let data = wb.worksheet_mut(1).unwrap();
    data.set_cell_value("A1", "Item").unwrap();
    data.set_cell_value("B1", "Amount").unwrap();
    data.set_cell_value("A2", "Widgets").unwrap();
    data.set_cell_value("B2", 12.5).unwrap();

    wb
}

pub fn write_sample(path: &Path) {
    XlsxWriter::write_file(&sample_workbook(), path).expect("write sample workbook");
}

/// Minimal single-sheet package carrying a calculation chain
pub fn write_with_calc_chain(path: &Path) {
    let file = std::fs::File::create(path).expect("create fixture");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let entries: [(&str, &str); 6] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/calcChain.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"/></Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Calc" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/calcChain" Target="calcChain.xml"/></Relationships>"#,
        ),
        (
            "xl/worksheets/sheet1.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1"><v>2</v></c><c r="B1"><f>A1*3</f><v>6</v></c></row></sheetData></worksheet>"#,
        ),
        (
            "xl/calcChain.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<calcChain xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><c r="B1" i="1"/></calcChain>"#,
        ),
    ];

    for (name, body) in entries {
        zip.start_file(name, options).expect("start entry");
        zip.write_all(body.as_bytes()).expect("write entry");
    }
    zip.finish().expect("finish fixture");
}

/// Raw text of one entry in a package
pub fn entry_text(path: &Path, name: &str) -> Option<String> {
    use std::io::Read;

    let file = std::fs::File::open(path).expect("open package");
    let mut archive = zip::ZipArchive::new(file).expect("read package");
    let mut entry = archive.by_name(name).ok()?;
    let mut text = String::new();
    entry.read_to_string(&mut text).expect("read entry");
    Some(text)
}
