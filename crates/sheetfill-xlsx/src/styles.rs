//! styles.xml: cell formats in and out
//!
//! Only fonts, borders and alignment are carried; fills and number formats
//! are written as the minimal defaults a spreadsheet application expects.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{attr, attr_parse, escape_xml};
use sheetfill_core::style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, FontStyle, HorizontalAlignment, Style,
    VerticalAlignment,
};
use sheetfill_core::Workbook;

/// Font written when a style leaves the family unset
const FALLBACK_FONT_NAME: &str = "Calibri";
/// Size written when a style leaves the size unset
const FALLBACK_FONT_SIZE: f64 = 11.0;

// === Writing ===

/// Workbook-wide format table built before writing
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Distinct styles; the position is the cellXfs index
    styles: Vec<Style>,
    /// Per worksheet: local style-pool index → cellXfs index
    sheet_maps: Vec<HashMap<u32, u32>>,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles = vec![Style::default()];
        let mut xf_ids: HashMap<Style, u32> = HashMap::new();
        xf_ids.insert(Style::default(), 0);

        let sheet_maps = workbook
            .worksheets()
            .map(|sheet| {
                sheet
                    .style_pool()
                    .iter()
                    .map(|(local, style)| {
                        let xf = *xf_ids.entry(style.clone()).or_insert_with(|| {
                            styles.push(style.clone());
                            (styles.len() - 1) as u32
                        });
                        (local, xf)
                    })
                    .collect()
            })
            .collect();

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fonts: Vec<&FontStyle> = Vec::new();
        let mut borders: Vec<&BorderStyle> = Vec::new();
        let mut xfs: Vec<(usize, usize, &Alignment)> = Vec::with_capacity(self.styles.len());

        for style in &self.styles {
            let font_id = intern(&mut fonts, &style.font);
            let border_id = intern(&mut borders, &style.border);
            xfs.push((font_id, border_id, &style.alignment));
        }

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(
            r#"
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>"#,
        );

        xml.push_str(&format!("\n  <borders count=\"{}\">", borders.len()));
        for border in &borders {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", xfs.len()));
        for (font_id, border_id, alignment) in xfs {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(font_id, border_id, alignment));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
</styleSheet>"#,
        );
        xml
    }
}

fn intern<'a, T: PartialEq>(table: &mut Vec<&'a T>, item: &'a T) -> usize {
    match table.iter().position(|t| *t == item) {
        Some(i) => i,
        None => {
            table.push(item);
            table.len() - 1
        }
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    s.push_str(&format!(
        "<sz val=\"{}\"/>",
        font.size.unwrap_or(FALLBACK_FONT_SIZE)
    ));
    s.push_str(&format!(
        "<name val=\"{}\"/>",
        escape_xml(font.name.as_deref().unwrap_or(FALLBACK_FONT_NAME))
    ));
    s.push_str("</font>");
    s
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge {
        None => format!("<{tag}/>"),
        Some(e) => format!(
            "<{tag} style=\"{}\"><color indexed=\"64\"/></{tag}>",
            e.style.as_xlsx()
        ),
    }
}

fn write_border(border: &BorderStyle) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str("<diagonal/></border>");
    s
}

fn write_alignment(al: &Alignment) -> Option<String> {
    if al == &Alignment::default() {
        return None;
    }
    let mut s = String::from("<alignment");
    if let Some(h) = al.horizontal.as_xlsx() {
        s.push_str(&format!(" horizontal=\"{}\"", h));
    }
    if let Some(v) = al.vertical.as_xlsx() {
        s.push_str(&format!(" vertical=\"{}\"", v));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    s.push_str("/>");
    Some(s)
}

fn write_xf(font_id: usize, border_id: usize, alignment: &Alignment) -> String {
    let mut s = format!(
        "<xf numFmtId=\"0\" fontId=\"{}\" fillId=\"0\" borderId=\"{}\" xfId=\"0\"",
        font_id, border_id
    );
    if font_id != 0 {
        s.push_str(" applyFont=\"1\"");
    }
    if border_id != 0 {
        s.push_str(" applyBorder=\"1\"");
    }
    match write_alignment(alignment) {
        Some(al) => {
            s.push_str(" applyAlignment=\"1\">");
            s.push_str(&al);
            s.push_str("</xf>");
        }
        None => s.push_str("/>"),
    }
    s
}

// === Reading ===

#[derive(Debug, Default)]
struct PendingXf {
    font_id: usize,
    border_id: usize,
    alignment: Alignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Fonts,
    Borders,
    CellXfs,
}

/// Parse styles.xml into the cellXfs table: one [`Style`] per `s` index
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut borders: Vec<BorderStyle> = Vec::new();
    let mut pending_xfs: Vec<PendingXf> = Vec::new();

    let mut section = Section::Other;
    let mut current_font: Option<FontStyle> = None;
    let mut current_border: Option<BorderStyle> = None;
    let mut current_xf: Option<PendingXf> = None;

    loop {
        let event = xml_reader.read_event_into(&mut buf);
        let (e, is_empty) = match event {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::End(e)) => {
                match e.local_name().as_ref() {
                    b"fonts" | b"borders" | b"cellXfs" => section = Section::Other,
                    b"font" => fonts.extend(current_font.take()),
                    b"border" => borders.extend(current_border.take()),
                    b"xf" => pending_xfs.extend(current_xf.take()),
                    _ => {}
                }
                buf.clear();
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {
                buf.clear();
                continue;
            }
        };

        match (section, e.local_name().as_ref()) {
            (_, b"fonts") if !is_empty => section = Section::Fonts,
            (_, b"borders") if !is_empty => section = Section::Borders,
            (_, b"cellXfs") if !is_empty => section = Section::CellXfs,

            (Section::Fonts, b"font") => {
                if is_empty {
                    fonts.push(FontStyle::default());
                } else {
                    current_font = Some(FontStyle::default());
                }
            }
            (Section::Fonts, b"b") => {
                if let Some(font) = current_font.as_mut() {
                    font.bold = !matches!(attr(&e, b"val").as_deref(), Some("0") | Some("false"));
                }
            }
            (Section::Fonts, b"sz") => {
                if let Some(font) = current_font.as_mut() {
                    font.size = attr_parse(&e, b"val");
                }
            }
            (Section::Fonts, b"name") => {
                if let Some(font) = current_font.as_mut() {
                    font.name = attr(&e, b"val");
                }
            }

            (Section::Borders, b"border") => {
                if is_empty {
                    borders.push(BorderStyle::default());
                } else {
                    current_border = Some(BorderStyle::default());
                }
            }
            (Section::Borders, side @ (b"left" | b"right" | b"top" | b"bottom")) => {
                if let Some(border) = current_border.as_mut() {
                    let edge = attr(&e, b"style")
                        .and_then(|s| BorderLineStyle::from_xlsx(&s))
                        .map(BorderEdge::new);
                    match side {
                        b"left" => border.left = edge,
                        b"right" => border.right = edge,
                        b"top" => border.top = edge,
                        _ => border.bottom = edge,
                    }
                }
            }

            (Section::CellXfs, b"xf") => {
                let xf = PendingXf {
                    font_id: attr_parse(&e, b"fontId").unwrap_or(0),
                    border_id: attr_parse(&e, b"borderId").unwrap_or(0),
                    alignment: Alignment::default(),
                };
                if is_empty {
                    pending_xfs.push(xf);
                } else {
                    current_xf = Some(xf);
                }
            }
            (Section::CellXfs, b"alignment") => {
                if let Some(xf) = current_xf.as_mut() {
                    xf.alignment = parse_alignment(&e);
                }
            }
            _ => {}
        }

        buf.clear();
    }

    let styles: Vec<Style> = pending_xfs
        .into_iter()
        .map(|xf| Style {
            font: fonts.get(xf.font_id).cloned().unwrap_or_default(),
            border: borders.get(xf.border_id).cloned().unwrap_or_default(),
            alignment: xf.alignment,
        })
        .collect();

    if styles.is_empty() {
        Ok(vec![Style::default()])
    } else {
        Ok(styles)
    }
}

fn parse_alignment(e: &BytesStart<'_>) -> Alignment {
    let mut alignment = Alignment::default();
    if let Some(h) = attr(e, b"horizontal").and_then(|v| HorizontalAlignment::from_xlsx(&v)) {
        alignment.horizontal = h;
    }
    if let Some(v) = attr(e, b"vertical").and_then(|v| VerticalAlignment::from_xlsx(&v)) {
        alignment.vertical = v;
    }
    alignment.wrap_text = matches!(attr(e, b"wrapText").as_deref(), Some("1") | Some("true"));
    alignment
}
