//! Package-level lookups: which sheet lives in which part

use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use crate::xml::attr;

pub(crate) const CONTENT_TYPES: &str = "[Content_Types].xml";
pub(crate) const WORKBOOK: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
pub(crate) const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
pub(crate) const STYLES: &str = "xl/styles.xml";
pub(crate) const CALC_CHAIN: &str = "xl/calcChain.xml";

/// A worksheet entry of the workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPart {
    /// Sheet name as shown on its tab
    pub name: String,
    /// Zip entry holding the sheet XML (e.g. `xl/worksheets/sheet1.xml`)
    pub path: String,
}

/// Worksheets in workbook order with their part paths
pub(crate) fn sheet_parts<R: Read + Seek>(archive: &mut ZipArchive<R>) -> XlsxResult<Vec<SheetPart>> {
    if archive.by_name(CONTENT_TYPES).is_err() {
        return Err(XlsxError::InvalidFormat(format!("Missing {}", CONTENT_TYPES)));
    }

    let sheets = read_sheet_entries(archive)?;
    let targets = read_worksheet_targets(archive)?;

    let mut parts = Vec::with_capacity(sheets.len());
    for (name, r_id) in sheets {
        match targets.get(&r_id) {
            Some(path) => parts.push(SheetPart { name, path: path.clone() }),
            None => tracing::warn!(sheet = %name, r_id = %r_id, "sheet has no worksheet relationship, skipping"),
        }
    }
    Ok(parts)
}

/// `(name, r:id)` of every `<sheet>` in workbook.xml
fn read_sheet_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> XlsxResult<Vec<(String, String)>> {
    let file = archive
        .by_name(WORKBOOK)
        .map_err(|_| XlsxError::MissingPart(WORKBOOK.into()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(r_id)) = (attr(&e, b"name"), attr(&e, b"r:id")) {
                    sheets.push((name, r_id));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Relationship id → part path for worksheet relationships
fn read_worksheet_targets<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> XlsxResult<HashMap<String, String>> {
    let file = archive
        .by_name(WORKBOOK_RELS)
        .map_err(|_| XlsxError::MissingPart(WORKBOOK_RELS.into()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = HashMap::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr(&e, b"Id");
                let target = attr(&e, b"Target");
                let is_sheet = attr(&e, b"Type").map_or(false, |t| t.ends_with("/worksheet"));
                if let (true, Some(id), Some(target)) = (is_sheet, id, target) {
                    rels.insert(id, resolve_target(&target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Targets are relative to `xl/` unless absolute
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }
}
