//! XLSX reader

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use crate::package::{self, SheetPart};
use crate::styles::read_styles_xml;
use crate::xml::{attr, attr_parse, decode_excel_escapes, RowCursor};
use sheetfill_core::style::Style;
use sheetfill_core::{CellAddress, CellRange, CellValue, Workbook, Worksheet};

/// XLSX file reader
///
/// Produces a [`Workbook`] with cell values (formula cells keep their cached
/// result), per-cell fonts/borders/alignment, merged regions, column widths,
/// row heights and the declared sheet dimension.
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = ZipArchive::new(reader)?;

        let parts = package::sheet_parts(&mut archive)?;
        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_styles = match archive.by_name(package::STYLES) {
            Ok(file) => read_styles_xml(file)?,
            Err(_) => vec![Style::default()],
        };

        let mut workbook = Workbook::new();
        for part in &parts {
            let mut worksheet = Worksheet::new(part.name.as_str());
            if let Some(default) = cell_styles.first() {
                worksheet.set_default_style(default.clone());
            }
            Self::read_worksheet(
                &mut archive,
                part,
                &mut worksheet,
                &shared_strings,
                &cell_styles,
            )?;
            workbook.push_worksheet(worksheet)?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(archive: &mut ZipArchive<R>) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name(package::SHARED_STRINGS) {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_t = false;
        // Phonetic runs repeat the text as a reading hint
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => current.clear(),
                    b"rPh" => in_phonetic = true,
                    b"t" if !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => strings.push(decode_excel_escapes(&current)),
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read one worksheet part into `worksheet`
    fn read_worksheet<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        part: &SheetPart,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        cell_styles: &[Style],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(&part.path)
            .map_err(|_| XlsxError::MissingPart(part.path.clone()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut cell: Option<PendingCell> = None;
        let mut text_target = TextTarget::None;
        let mut row_cursor = RowCursor::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"row" => Self::enter_row(&e, &mut row_cursor, worksheet),
                    b"c" => cell = Some(PendingCell::from_element(&e, &mut row_cursor)),
                    b"v" if cell.is_some() => text_target = TextTarget::Value,
                    b"f" if cell.is_some() => {
                        text_target = TextTarget::Formula;
                        if let Some(c) = cell.as_mut() {
                            c.formula.get_or_insert_with(String::new);
                        }
                    }
                    b"t" if cell.is_some() => text_target = TextTarget::Inline,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"row" => Self::enter_row(&e, &mut row_cursor, worksheet),
                    b"c" => {
                        let pending = PendingCell::from_element(&e, &mut row_cursor);
                        pending.store(worksheet, shared_strings, cell_styles)?;
                    }
                    b"f" => {
                        // Shared-formula followers carry no text but are still formulas
                        if let Some(c) = cell.as_mut() {
                            c.formula.get_or_insert_with(String::new);
                        }
                    }
                    b"col" => Self::read_column(&e, worksheet),
                    b"mergeCell" => Self::read_merge(&e, worksheet),
                    // Often stale; the extent comes from the stored cells
                    b"dimension" => {
                        tracing::debug!(sheet = worksheet.name(), declared = ?attr(&e, b"ref"), "ignoring declared dimension");
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some(c) = cell.as_mut() {
                        let text = e.unescape()?;
                        match text_target {
                            TextTarget::Value => c.value.push_str(&text),
                            TextTarget::Inline => c.inline.push_str(&text),
                            TextTarget::Formula => {
                                c.formula.get_or_insert_with(String::new).push_str(&text)
                            }
                            TextTarget::None => {}
                        }
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            pending.store(worksheet, shared_strings, cell_styles)?;
                        }
                        text_target = TextTarget::None;
                    }
                    b"v" | b"f" | b"t" => text_target = TextTarget::None,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn enter_row(e: &BytesStart<'_>, cursor: &mut RowCursor, worksheet: &mut Worksheet) {
        let row = cursor.enter_row(attr_parse(e, b"r"));
        if let Some(height) = attr_parse::<f64>(e, b"ht") {
            worksheet.set_row_height(row, height);
        }
    }

    fn read_column(e: &BytesStart<'_>, worksheet: &mut Worksheet) {
        let min: Option<u16> = attr_parse(e, b"min");
        let max: Option<u16> = attr_parse(e, b"max");
        let width: Option<f64> = attr_parse(e, b"width");
        if let (Some(min), Some(max), Some(width)) = (min, max, width) {
            for col in min.max(1)..=max.min(sheetfill_core::MAX_COLS) {
                worksheet.set_column_width(col - 1, width);
            }
        }
    }

    fn read_merge(e: &BytesStart<'_>, worksheet: &mut Worksheet) {
        let Some(reference) = attr(e, b"ref") else {
            return;
        };
        match CellRange::parse(&reference) {
            Ok(range) => {
                if let Err(err) = worksheet.merge_cells(&range) {
                    tracing::warn!(sheet = worksheet.name(), range = %reference, error = %err, "ignoring merged range");
                }
            }
            Err(err) => {
                tracing::warn!(sheet = worksheet.name(), range = %reference, error = %err, "ignoring malformed merged range");
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Formula,
    Inline,
}

/// A `<c>` element collected until its end tag
#[derive(Debug)]
struct PendingCell {
    addr: Option<CellAddress>,
    reference: Option<String>,
    cell_type: Option<String>,
    style_index: Option<usize>,
    value: String,
    inline: String,
    formula: Option<String>,
}

impl PendingCell {
    fn from_element(e: &BytesStart<'_>, cursor: &mut RowCursor) -> Self {
        let reference = attr(e, b"r");
        Self {
            addr: cursor.locate(reference.as_deref()),
            reference,
            cell_type: attr(e, b"t"),
            style_index: attr_parse(e, b"s"),
            value: String::new(),
            inline: String::new(),
            formula: None,
        }
    }

    fn resolve_value(&self, shared_strings: &[String]) -> XlsxResult<CellValue> {
        let raw = self.value.as_str();
        let value = match self.cell_type.as_deref() {
            Some("inlineStr") if !self.inline.is_empty() => CellValue::String(decode_excel_escapes(&self.inline)),
            _ if raw.is_empty() => CellValue::Empty,
            Some("s") => {
                let idx: usize = raw.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", raw))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }
            Some("b") => CellValue::Boolean(raw.trim() == "1" || raw.eq_ignore_ascii_case("true")),
            Some("e") => CellValue::Error(raw.to_string()),
            Some("str") => CellValue::String(decode_excel_escapes(raw)),
            None | Some("n") => match raw.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(raw.to_string()),
            },
            Some(_) => CellValue::String(raw.to_string()),
        };
        Ok(value)
    }

    fn store(
        self,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        cell_styles: &[Style],
    ) -> XlsxResult<()> {
        let Some(addr) = self.addr else {
            return Err(XlsxError::Parse(format!(
                "Invalid cell reference '{}'",
                self.reference.as_deref().unwrap_or_default()
            )));
        };

        let value = self.resolve_value(shared_strings)?;
        let value = match self.formula {
            Some(text) => CellValue::Formula {
                text,
                cached_value: (!value.is_empty()).then(|| Box::new(value)),
            },
            None => value,
        };
        if !matches!(value, CellValue::Empty) {
            worksheet.set_cell_value_at(addr.row, addr.col, value)?;
        }

        if let Some(idx) = self.style_index.filter(|&i| i != 0) {
            match cell_styles.get(idx) {
                Some(style) => worksheet.set_cell_style_at(addr.row, addr.col, style)?,
                None => tracing::warn!(
                    sheet = worksheet.name(),
                    cell = %addr,
                    style = idx,
                    "style index out of range, using default"
                ),
            }
        }

        Ok(())
    }
}
