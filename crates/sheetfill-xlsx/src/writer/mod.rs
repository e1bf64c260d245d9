//! XLSX writer

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::XlsxStyleTable;
use crate::xml::escape_xml;
use sheetfill_core::{format_number, CellValue, Workbook};

/// XLSX file writer
///
/// Writes values, fonts, borders, alignment, merged regions, column widths
/// and row heights. Strings are written inline, so no shared-string table is
/// produced.
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write(workbook, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "a workbook needs at least one worksheet".into(),
            ));
        }

        let mut zip = ZipWriter::new(writer);
        let style_table = XlsxStyleTable::build(workbook);

        Self::write_part(&mut zip, "[Content_Types].xml", &Self::content_types(workbook))?;
        Self::write_part(&mut zip, "_rels/.rels", ROOT_RELS)?;
        Self::write_part(&mut zip, "xl/workbook.xml", &Self::workbook_xml(workbook))?;
        Self::write_part(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &Self::workbook_rels(workbook),
        )?;
        Self::write_part(&mut zip, "xl/styles.xml", &style_table.to_styles_xml())?;

        for i in 0..workbook.sheet_count() {
            let xml = Self::worksheet_xml(workbook, i, &style_table)?;
            Self::write_part(&mut zip, &format!("xl/worksheets/sheet{}.xml", i + 1), &xml)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        zip.start_file(name, SimpleFileOptions::default())?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn content_types(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );
        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }
        content.push_str("\n</Types>");
        content
    }

    fn workbook_xml(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
        );
        for (i, sheet) in workbook.worksheets().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                i + 1,
                i + 1
            ));
        }
        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );
        content
    }

    fn workbook_rels(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#,
            workbook.sheet_count() + 1
        ));
        content
    }

    fn worksheet_xml(
        workbook: &Workbook,
        index: usize,
        style_table: &XlsxStyleTable,
    ) -> XlsxResult<String> {
        let sheet = workbook
            .worksheet(index)
            .ok_or_else(|| XlsxError::InvalidFormat("Sheet not found".into()))?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );
        content.push_str(&format!("\n    <dimension ref=\"{}\"/>", sheet.bounds()));

        if !sheet.column_widths().is_empty() {
            content.push_str("\n    <cols>");
            for (&col, &width) in sheet.column_widths() {
                content.push_str(&format!(
                    "\n        <col min=\"{0}\" max=\"{0}\" width=\"{1}\" customWidth=\"1\"/>",
                    col + 1,
                    width
                ));
            }
            content.push_str("\n    </cols>");
        }

        content.push_str("\n    <sheetData>");

        // Rows with a height but no cells still need a <row> element
        let mut rows: std::collections::BTreeMap<u32, Vec<String>> = sheet
            .row_heights()
            .keys()
            .map(|&r| (r, Vec::new()))
            .collect();
        for (addr, cell) in sheet.iter_cells() {
            let xf_id = style_table.xf_id_for(index, cell.style_index);
            if let Some(xml) = cell_element(&addr.to_a1_string(), Some(xf_id), &cell.value) {
                rows.entry(addr.row).or_default().push(xml);
            }
        }

        for (row, cells) in rows {
            let height = sheet
                .row_height(row)
                .map(|h| format!(" ht=\"{}\" customHeight=\"1\"", h))
                .unwrap_or_default();
            if cells.is_empty() {
                content.push_str(&format!("\n        <row r=\"{}\"{}/>", row + 1, height));
                continue;
            }
            content.push_str(&format!("\n        <row r=\"{}\"{}>", row + 1, height));
            for cell in cells {
                content.push_str("\n            ");
                content.push_str(&cell);
            }
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>");

        let merged = sheet.merged_regions();
        if !merged.is_empty() {
            content.push_str(&format!("\n    <mergeCells count=\"{}\">", merged.len()));
            for range in merged {
                content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
            }
            content.push_str("\n    </mergeCells>");
        }

        content.push_str("\n</worksheet>");
        Ok(content)
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

/// Serialize one `<c>` element.
///
/// Returns `None` for an empty value with no style, which needs no element.
pub(crate) fn cell_element(reference: &str, xf_id: Option<u32>, value: &CellValue) -> Option<String> {
    let style_attr = match xf_id {
        Some(id) if id != 0 => format!(" s=\"{}\"", id),
        _ => String::new(),
    };

    let xml = match value {
        CellValue::Empty => {
            if style_attr.is_empty() {
                return None;
            }
            format!("<c r=\"{}\"{}/>", reference, style_attr)
        }
        CellValue::Formula { text, cached_value } => {
            let (type_attr, cached) = match cached_value.as_deref() {
                Some(v) => scalar_parts(v),
                None => (String::new(), String::new()),
            };
            format!(
                "<c r=\"{}\"{}{}><f>{}</f>{}</c>",
                reference,
                style_attr,
                type_attr,
                escape_xml(text.trim_start_matches('=')),
                cached
            )
        }
        CellValue::String(s) => format!(
            "<c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
            reference,
            style_attr,
            escape_xml(s)
        ),
        other => {
            let (type_attr, body) = scalar_parts(other);
            format!("<c r=\"{}\"{}{}>{}</c>", reference, style_attr, type_attr, body)
        }
    };
    Some(xml)
}

/// Type attribute and `<v>` body for a non-formula value
fn scalar_parts(value: &CellValue) -> (String, String) {
    match value {
        CellValue::Number(n) if n.is_finite() => {
            (String::new(), format!("<v>{}</v>", format_number(*n)))
        }
        CellValue::Number(_) => (" t=\"e\"".into(), "<v>#NUM!</v>".into()),
        CellValue::Boolean(b) => (" t=\"b\"".into(), format!("<v>{}</v>", u8::from(*b))),
        CellValue::String(s) => (" t=\"str\"".into(), format!("<v>{}</v>", escape_xml(s))),
        CellValue::Error(e) => (" t=\"e\"".into(), format!("<v>{}</v>", escape_xml(e))),
        CellValue::Empty | CellValue::Formula { .. } => (String::new(), String::new()),
    }
}
