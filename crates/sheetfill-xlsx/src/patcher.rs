//! In-place cell patching
//!
//! [`XlsxPatcher`] copies a package entry by entry. Worksheet parts that
//! receive edits are re-emitted event by event with the targeted `<c>`
//! elements replaced or inserted in row/column order; every other entry is
//! raw-copied without recompression.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{XlsxError, XlsxResult};
use crate::package::{self, CALC_CHAIN, CONTENT_TYPES, WORKBOOK_RELS};
use crate::writer::cell_element;
use crate::xml::{attr, attr_parse, RowCursor};
use sheetfill_core::{CellAddress, CellValue};

/// Cell values to write, grouped by sheet name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellEdits {
    sheets: BTreeMap<String, BTreeMap<CellAddress, CellValue>>,
}

impl CellEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a value; a later value for the same cell replaces the earlier one
    pub fn set<S: Into<String>>(&mut self, sheet: S, addr: CellAddress, value: CellValue) {
        self.sheets
            .entry(sheet.into())
            .or_default()
            .insert(addr, value);
    }

    /// Number of queued cell writes
    pub fn len(&self) -> usize {
        self.sheets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queued writes for one sheet
    pub fn for_sheet(&self, sheet: &str) -> Option<&BTreeMap<CellAddress, CellValue>> {
        self.sheets.get(sheet)
    }
}

/// What a patch run changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Existing `<c>` elements overwritten
    pub replaced: usize,
    /// Cells that had no element and were inserted
    pub inserted: usize,
    /// Whether the calculation chain was removed
    pub dropped_calc_chain: bool,
}

/// Writes cell values into an existing XLSX package
pub struct XlsxPatcher;

impl XlsxPatcher {
    /// Patch `src` into a new file at `dst`
    pub fn patch_file<P: AsRef<Path>, Q: AsRef<Path>>(
        src: P,
        dst: Q,
        edits: &CellEdits,
    ) -> XlsxResult<PatchReport> {
        let input = BufReader::new(File::open(src)?);
        let mut output = BufWriter::new(File::create(dst)?);
        let report = Self::patch(input, &mut output, edits)?;
        output.flush()?;
        Ok(report)
    }

    /// Patch a package read from `src`, writing the result to `dst`
    pub fn patch<R: Read + Seek, W: Write + Seek>(
        src: R,
        dst: W,
        edits: &CellEdits,
    ) -> XlsxResult<PatchReport> {
        let mut archive = ZipArchive::new(src)?;
        let parts = package::sheet_parts(&mut archive)?;

        let mut targets: HashMap<&str, &BTreeMap<CellAddress, CellValue>> = HashMap::new();
        for (sheet, cells) in &edits.sheets {
            let part = parts
                .iter()
                .find(|p| &p.name == sheet)
                .ok_or_else(|| XlsxError::UnknownSheet(sheet.clone()))?;
            if !cells.is_empty() {
                targets.insert(part.path.as_str(), cells);
            }
        }

        let has_calc_chain = archive.by_name(CALC_CHAIN).is_ok();
        let drop_calc_chain = has_calc_chain && !targets.is_empty();

        let mut report = PatchReport {
            dropped_calc_chain: drop_calc_chain,
            ..PatchReport::default()
        };
        let mut zip = ZipWriter::new(dst);

        for i in 0..archive.len() {
            let name = archive.by_index_raw(i)?.name().to_string();

            if let Some(cells) = targets.get(name.as_str()) {
                let bytes = read_entry(&mut archive, i)?;
                let mut sheet = SheetPatch::new(cells);
                let patched = sheet.run(&bytes)?;
                report.replaced += sheet.replaced;
                report.inserted += sheet.inserted;
                tracing::debug!(part = %name, replaced = sheet.replaced, inserted = sheet.inserted, "patched worksheet part");

                zip.start_file(name.as_str(), SimpleFileOptions::default())?;
                zip.write_all(&patched)?;
            } else if drop_calc_chain && name == CALC_CHAIN {
                tracing::debug!("dropping calculation chain");
            } else if drop_calc_chain && (name == CONTENT_TYPES || name == WORKBOOK_RELS) {
                let bytes = read_entry(&mut archive, i)?;
                let stripped = strip_calc_chain_refs(&bytes)?;
                zip.start_file(name.as_str(), SimpleFileOptions::default())?;
                zip.write_all(&stripped)?;
            } else {
                zip.raw_copy_file(archive.by_index_raw(i)?)?;
            }
        }

        zip.finish()?;
        Ok(report)
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, index: usize) -> XlsxResult<Vec<u8>> {
    let mut file = archive.by_index(index)?;
    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Whether a skipped cell continues past `event`
fn still_in_cell(event: &Event<'_>) -> bool {
    match event {
        Event::End(e) if e.local_name().as_ref() == b"c" => false,
        Event::Start(e) | Event::Empty(e)
            if e.local_name().as_ref() == b"f"
                && attr(e, b"t").as_deref() == Some("shared")
                && attr(e, b"ref").is_some() =>
        {
            tracing::warn!(
                "overwriting the anchor of a shared formula; dependent cells lose their formula"
            );
            true
        }
        _ => true,
    }
}

fn is_calc_chain_ref(e: &BytesStart<'_>) -> bool {
    match e.local_name().as_ref() {
        b"Override" => attr(e, b"PartName").as_deref() == Some("/xl/calcChain.xml"),
        b"Relationship" => attr(e, b"Type").map_or(false, |t| t.ends_with("/calcChain")),
        _ => false,
    }
}

/// Remove calcChain entries from `[Content_Types].xml` or the workbook rels
fn strip_calc_chain_refs(xml: &[u8]) -> XlsxResult<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut buf = Vec::new();
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(ref e) if skip_depth > 0 || is_calc_chain_ref(e) => skip_depth += 1,
            Event::End(_) if skip_depth > 0 => skip_depth -= 1,
            Event::Empty(ref e) if is_calc_chain_ref(e) => {}
            _ if skip_depth > 0 => {}
            other => writer.write_event(other)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

/// Streaming rewrite of one worksheet part
struct SheetPatch<'a> {
    pending: BTreeMap<CellAddress, &'a CellValue>,
    writer: Writer<Vec<u8>>,
    replaced: usize,
    inserted: usize,
}

impl<'a> SheetPatch<'a> {
    fn new(cells: &'a BTreeMap<CellAddress, CellValue>) -> Self {
        Self {
            pending: cells.iter().map(|(a, v)| (*a, v)).collect(),
            writer: Writer::new(Vec::new()),
            replaced: 0,
            inserted: 0,
        }
    }

    fn run(&mut self, xml: &[u8]) -> XlsxResult<Vec<u8>> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut cursor = RowCursor::default();
        let mut in_sheet_data = false;
        let mut current_row: Option<u32> = None;
        let mut skipping_cell = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,

                event if skipping_cell => skipping_cell = still_in_cell(&event),

                Event::Start(e) if e.local_name().as_ref() == b"sheetData" => {
                    in_sheet_data = true;
                    self.writer.write_event(Event::Start(e))?;
                }
                Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                    let end = BytesEnd::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                    self.writer.write_event(Event::Start(e))?;
                    self.flush_rows_before(None);
                    self.writer.write_event(Event::End(end))?;
                }
                Event::End(e) if e.local_name().as_ref() == b"sheetData" => {
                    self.flush_rows_before(None);
                    in_sheet_data = false;
                    self.writer.write_event(Event::End(e))?;
                }

                Event::Start(e) if in_sheet_data && e.local_name().as_ref() == b"row" => {
                    let row = cursor.enter_row(attr_parse(&e, b"r"));
                    self.flush_rows_before(Some(row));
                    current_row = Some(row);
                    self.writer.write_event(Event::Start(e))?;
                }
                Event::Empty(e) if in_sheet_data && e.local_name().as_ref() == b"row" => {
                    let row = cursor.enter_row(attr_parse(&e, b"r"));
                    self.flush_rows_before(Some(row));
                    if self.has_row(row) {
                        let end =
                            BytesEnd::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                        self.writer.write_event(Event::Start(e))?;
                        self.flush_cells(row, None);
                        self.writer.write_event(Event::End(end))?;
                    } else {
                        self.writer.write_event(Event::Empty(e))?;
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"row" => {
                    if let Some(row) = current_row.take() {
                        self.flush_cells(row, None);
                    }
                    self.writer.write_event(Event::End(e))?;
                }

                Event::Start(e) if current_row.is_some() && e.local_name().as_ref() == b"c" => {
                    if self.replace_cell(&e, &mut cursor) {
                        skipping_cell = true;
                    } else {
                        self.writer.write_event(Event::Start(e))?;
                    }
                }
                Event::Empty(e) if current_row.is_some() && e.local_name().as_ref() == b"c" => {
                    if !self.replace_cell(&e, &mut cursor) {
                        self.writer.write_event(Event::Empty(e))?;
                    }
                }

                other => self.writer.write_event(other)?,
            }
            buf.clear();
        }

        if !self.pending.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "worksheet part has no <sheetData> element".into(),
            ));
        }

        Ok(std::mem::take(self.writer.get_mut()))
    }

    /// Write a replacement for `<c>` if it is targeted; returns whether it was
    fn replace_cell(&mut self, e: &BytesStart<'_>, cursor: &mut RowCursor) -> bool {
        let Some(addr) = cursor.locate(attr(e, b"r").as_deref()) else {
            return false;
        };
        self.flush_cells(addr.row, Some(addr.col));

        let Some(value) = self.pending.remove(&addr) else {
            return false;
        };
        let style = attr_parse::<u32>(e, b"s");
        if let Some(xml) = cell_element(&addr.to_a1_string(), style, value) {
            self.write_raw(&xml);
        }
        self.replaced += 1;
        true
    }

    fn has_row(&self, row: u32) -> bool {
        self.row_range(row).next().is_some()
    }

    fn row_range(&self, row: u32) -> impl Iterator<Item = CellAddress> + '_ {
        self.pending
            .range(CellAddress::new(row, 0)..=CellAddress::new(row, u16::MAX))
            .map(|(a, _)| *a)
    }

    /// Insert pending cells of `row` left of `before` (all when `None`)
    fn flush_cells(&mut self, row: u32, before: Option<u16>) {
        let due: Vec<CellAddress> = self
            .row_range(row)
            .filter(|a| before.map_or(true, |col| a.col < col))
            .collect();
        for addr in due {
            if let Some(value) = self.pending.remove(&addr) {
                if let Some(xml) = cell_element(&addr.to_a1_string(), None, value) {
                    self.write_raw(&xml);
                }
                self.inserted += 1;
            }
        }
    }

    /// Insert whole rows for pending cells above `before` (all when `None`)
    fn flush_rows_before(&mut self, before: Option<u32>) {
        let rows: BTreeSet<u32> = self
            .pending
            .keys()
            .map(|a| a.row)
            .filter(|&r| before.map_or(true, |b| r < b))
            .collect();
        for row in rows {
            self.write_raw(&format!("<row r=\"{}\">", row + 1));
            self.flush_cells(row, None);
            self.write_raw("</row>");
        }
    }

    fn write_raw(&mut self, xml: &str) {
        self.writer.get_mut().extend_from_slice(xml.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    fn patch_xml(xml: &str, edits: &[(&str, CellValue)]) -> (String, usize, usize) {
        let cells: BTreeMap<CellAddress, CellValue> =
            edits.iter().map(|(a, v)| (addr(a), v.clone())).collect();
        let mut sheet = SheetPatch::new(&cells);
        let out = sheet.run(xml.as_bytes()).unwrap();
        (
            String::from_utf8(out).unwrap(),
            sheet.replaced,
            sheet.inserted,
        )
    }

    #[test]
    fn test_replace_existing_cell_keeps_style_and_drops_formula() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" s="4"><f>B1*2</f><v>6</v></c><c r="B1"><v>3</v></c></row></sheetData></worksheet>"#;
        let (out, replaced, inserted) = patch_xml(xml, &[("A1", CellValue::Number(1234.0))]);
        assert_eq!(
            out,
            r#"<worksheet><sheetData><row r="1"><c r="A1" s="4"><v>1234</v></c><c r="B1"><v>3</v></c></row></sheetData></worksheet>"#
        );
        assert_eq!((replaced, inserted), (1, 0));
    }

    #[test]
    fn test_insert_cells_and_rows_in_order() {
        let xml = r#"<worksheet><sheetData><row r="2"><c r="B2"><v>1</v></c></row><row r="5" ht="20"/></sheetData></worksheet>"#;
        let (out, replaced, inserted) = patch_xml(
            xml,
            &[
                ("C1", CellValue::string("top")),
                ("A2", CellValue::Boolean(true)),
                ("D2", CellValue::Number(12.5)),
                ("A5", CellValue::Number(5.0)),
                ("A9", CellValue::string("tail")),
            ],
        );
        assert_eq!(
            out,
            concat!(
                r#"<worksheet><sheetData>"#,
                r#"<row r="1"><c r="C1" t="inlineStr"><is><t xml:space="preserve">top</t></is></c></row>"#,
                r#"<row r="2"><c r="A2" t="b"><v>1</v></c><c r="B2"><v>1</v></c><c r="D2"><v>12.5</v></c></row>"#,
                r#"<row r="5" ht="20"><c r="A5"><v>5</v></c></row>"#,
                r#"<row r="9"><c r="A9" t="inlineStr"><is><t xml:space="preserve">tail</t></is></c></row>"#,
                r#"</sheetData></worksheet>"#
            )
        );
        assert_eq!((replaced, inserted), (0, 5));
    }

    #[test]
    fn test_empty_sheet_data() {
        let xml = r#"<worksheet><sheetData/></worksheet>"#;
        let (out, _, inserted) = patch_xml(xml, &[("B3", CellValue::Number(7.0))]);
        assert_eq!(
            out,
            r#"<worksheet><sheetData><row r="3"><c r="B3"><v>7</v></c></row></sheetData></worksheet>"#
        );
        assert_eq!(inserted, 1);
    }

    #[test]
    fn test_strip_calc_chain_refs() {
        let types = r#"<Types><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/calcChain.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"/><Override PartName="/xl/workbook.xml" ContentType="x"/></Types>"#;
        let out = String::from_utf8(strip_calc_chain_refs(types.as_bytes()).unwrap()).unwrap();
        assert_eq!(
            out,
            r#"<Types><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="x"/></Types>"#
        );

        let rels = r#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/calcChain" Target="calcChain.xml"/></Relationships>"#;
        let out = String::from_utf8(strip_calc_chain_refs(rels.as_bytes()).unwrap()).unwrap();
        assert!(!out.contains("calcChain"));
        assert!(out.contains("sheet1.xml"));
    }
}
