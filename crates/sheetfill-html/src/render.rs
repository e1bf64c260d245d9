//! Worksheet to HTML table

use std::fmt;

use sheetfill_core::geometry::{self, CellRole, DEFAULT_ROW_HEIGHT};
use sheetfill_core::{CellAddress, CellValue, Worksheet};

use crate::classify::{classify, CellStyle};

/// Stylesheet defining the header look and the three style classes
pub const STYLESHEET: &str = r#"<style type="text/css">
    .ritz .waffle a {
        color: inherit;
    }
    .ritz .waffle {
        border-collapse: collapse;
        font-family: Arial, sans-serif;
        font-size: 10pt;
    }
    .ritz .waffle td, .ritz .waffle th {
        padding: 3px;
        border: 1px solid #ccc;
    }
    .column-headers-background {
        background-color: #f0f0f0;
        font-weight: bold;
    }
    .row-headers-background {
        background-color: #f0f0f0;
        font-weight: bold;
        text-align: center;
    }
    .row-header-wrapper {
        line-height: 18px;
    }
    .plain-9, .plain-11, .bordered-centered {
        vertical-align: bottom;
        white-space: nowrap;
        color: #000000;
        direction: ltr;
        padding: 0px 3px 0px 3px;
    }
    .plain-9 {
        border: none;
        text-align: left;
        font-family: Calibri, Arial, sans-serif;
        font-size: 9pt;
    }
    .plain-11 {
        border: none;
        text-align: left;
        font-family: Calibri, sans-serif;
        font-size: 11pt;
    }
    .bordered-centered {
        border: 1px solid #000000;
        text-align: center;
        font-family: Calibri, Arial, sans-serif;
        font-size: 9pt;
    }
</style>"#;

/// A rendered worksheet
///
/// Rows are numbered from 1 and columns lettered from `A` exactly as the
/// header ids in the markup say; nothing else is needed to address a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    markup: String,
    rows: u32,
    columns: u16,
}

impl RenderedTable {
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn into_markup(self) -> String {
        self.markup
    }

    /// Number of `row{n}` headers (0 for an empty worksheet)
    pub fn row_count(&self) -> u32 {
        self.rows
    }

    /// Number of `col{n}` headers (0 for an empty worksheet)
    pub fn column_count(&self) -> u16 {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

impl fmt::Display for RenderedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup)
    }
}

/// Escape text for element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_blank(worksheet: &Worksheet) -> bool {
    let bounds = worksheet.bounds();
    bounds.row_count() == 1 && bounds.col_count() == 1 && worksheet.get_value_at(0, 0).is_empty()
}

fn cell_text(value: &CellValue) -> String {
    match value.resolved() {
        CellValue::Number(_) | CellValue::Boolean(_) => value.to_string(),
        other => escape_html(&other.to_string()),
    }
}

/// Render a worksheet as a header-addressed HTML table
pub fn render(worksheet: &Worksheet) -> RenderedTable {
    if is_blank(worksheet) {
        return RenderedTable {
            markup: "<p>Empty worksheet</p>".into(),
            rows: 0,
            columns: 0,
        };
    }

    let geometry = geometry::resolve(worksheet);
    let bounds = worksheet.bounds();
    let (max_row, max_col) = (bounds.end.row, bounds.end.col);

    let mut lines: Vec<String> = Vec::new();
    lines.push(r#"<div class="ritz grid-container" dir="ltr">"#.into());
    lines.push(r#"<table class="waffle" cellspacing="0" cellpadding="0">"#.into());

    lines.push("<thead><tr>".into());
    lines.push(r#"<th class="row-header freezebar-origin-ltr"></th>"#.into());
    for col in 0..=max_col {
        let width = geometry
            .column_width(col)
            .map(|w| format!(r#" style="width:{};""#, w))
            .unwrap_or_default();
        lines.push(format!(
            r#"<th id="col{}"{} class="column-headers-background">{}</th>"#,
            col as u32 + 1,
            width,
            CellAddress::column_to_letters(col)
        ));
    }
    lines.push("</tr></thead>".into());

    lines.push("<tbody>".into());
    for row in 0..=max_row {
        let display_row = row + 1;
        let height = match geometry.row_height(row) {
            Some(h) => format!(r#" style="height:{};""#, h),
            None => format!(r#" style="height:{}""#, DEFAULT_ROW_HEIGHT),
        };

        lines.push(format!("<tr{}>", height));
        lines.push(format!(
            r#"<th id="row{}"{} class="row-headers-background">"#,
            display_row, height
        ));
        lines.push(format!(
            r#"<div class="row-header-wrapper" style="line-height: 18px">{}</div>"#,
            display_row
        ));
        lines.push("</th>".into());

        for col in 0..=max_col {
            let addr = CellAddress::new(row, col);
            let span = match geometry.classify(&addr) {
                CellRole::Hidden => continue,
                CellRole::Governing(span) => Some(span),
                CellRole::Ordinary => None,
            };

            let mut attrs = match classify(worksheet.cell_style_at(row, col)) {
                CellStyle::Class(class) => format!(r#" class="{}""#, class),
                CellStyle::Inline(css) => format!(r#" style="{}""#, css),
            };
            if let Some(span) = span {
                if let Some(colspan) = span.colspan {
                    attrs.push_str(&format!(r#" colspan="{}""#, colspan));
                }
                if let Some(rowspan) = span.rowspan {
                    attrs.push_str(&format!(r#" rowspan="{}""#, rowspan));
                }
            }

            let text = worksheet
                .cell_at(row, col)
                .map(|c| cell_text(&c.value))
                .unwrap_or_default();
            lines.push(format!("<td{}>{}</td>", attrs, text));
        }

        lines.push("</tr>".into());
    }
    lines.push("</tbody>".into());
    lines.push("</table>".into());
    lines.push("</div>".into());

    RenderedTable {
        markup: lines.join("\n"),
        rows: max_row + 1,
        columns: max_col + 1,
    }
}

/// Render a standalone HTML page for one worksheet of `workbook_base`
pub fn render_page(worksheet: &Worksheet, workbook_base: &str) -> String {
    let name = escape_html(worksheet.name());
    [
        "<!DOCTYPE html>".to_string(),
        "<html>".into(),
        "<head>".into(),
        r#"<meta http-equiv="Content-Type" content="text/html; charset=utf-8">"#.into(),
        format!("<title>{} - {}</title>", name, escape_html(workbook_base)),
        STYLESHEET.into(),
        "</head>".into(),
        "<body>".into(),
        format!("<h1>Sheet: {}</h1>", name),
        render(worksheet).into_markup(),
        "</body>".into(),
        "</html>".into(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetfill_core::{BorderLineStyle, BorderStyle, CellRange, Style};

    #[test]
    fn test_empty_worksheet() {
        let ws = Worksheet::new("Blank");
        let table = render(&ws);
        assert_eq!(table.markup(), "<p>Empty worksheet</p>");
        assert!(table.is_empty());
    }

    #[test]
    fn test_single_value_in_a1_is_not_empty() {
        let mut ws = Worksheet::new("One");
        ws.set_cell_value("A1", "x").unwrap();
        assert_eq!(render(&ws).row_count(), 1);
    }

    #[test]
    fn test_render_small_sheet() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value("A1", "Name").unwrap();
        ws.set_cell_value("B1", 42.0).unwrap();
        ws.set_cell_value("A2", "a < b").unwrap();
        ws.set_cell_value("B2", true).unwrap();
        ws.set_column_width(0, 10.5);
        ws.set_row_height(1, 20.0);

        let expected = [
            r#"<div class="ritz grid-container" dir="ltr">"#,
            r#"<table class="waffle" cellspacing="0" cellpadding="0">"#,
            "<thead><tr>",
            r#"<th class="row-header freezebar-origin-ltr"></th>"#,
            r#"<th id="col1" style="width:73px;" class="column-headers-background">A</th>"#,
            r#"<th id="col2" class="column-headers-background">B</th>"#,
            "</tr></thead>",
            "<tbody>",
            r#"<tr style="height:18px">"#,
            r#"<th id="row1" style="height:18px" class="row-headers-background">"#,
            r#"<div class="row-header-wrapper" style="line-height: 18px">1</div>"#,
            "</th>",
            r#"<td class="plain-9">Name</td>"#,
            r#"<td class="plain-9">42</td>"#,
            "</tr>",
            r#"<tr style="height:26px;">"#,
            r#"<th id="row2" style="height:26px;" class="row-headers-background">"#,
            r#"<div class="row-header-wrapper" style="line-height: 18px">2</div>"#,
            "</th>",
            r#"<td class="plain-9">a &lt; b</td>"#,
            r#"<td class="plain-9">TRUE</td>"#,
            "</tr>",
            "</tbody>",
            "</table>",
            "</div>",
        ]
        .join("\n");

        assert_eq!(render(&ws).markup(), expected);
    }

    #[test]
    fn test_merged_cells() {
        let mut ws = Worksheet::new("Summary");
        ws.set_cell_value("A1", "Header").unwrap();
        ws.set_cell_value("B1", "hidden").unwrap();
        ws.set_cell_value("C3", 1.0).unwrap();
        ws.merge_cells(&CellRange::parse("A1:B1").unwrap()).unwrap();
        ws.merge_cells(&CellRange::parse("C1:C2").unwrap()).unwrap();

        let markup = render(&ws).into_markup();
        assert!(markup.contains(r#"<td class="plain-9" colspan="2">Header</td>"#));
        assert!(markup.contains(r#"<td class="plain-9" rowspan="2"></td>"#));
        assert!(!markup.contains("hidden"));

        // row 2 only has A2 and B2; C2 is covered by the C1 merge
        let row2 = markup.split(r#"id="row2""#).nth(1).unwrap();
        let row2 = &row2[..row2.find("</tr>").unwrap()];
        assert_eq!(row2.matches("<td").count(), 2);
    }

    #[test]
    fn test_inline_style_cell() {
        let mut ws = Worksheet::new("Styled");
        ws.set_cell_value("A1", "Boxed").unwrap();
        let style = Style::new()
            .font_name("Arial")
            .border(BorderStyle::all(BorderLineStyle::Thin));
        ws.set_cell_style("A1", &style).unwrap();

        let markup = render(&ws).into_markup();
        assert!(markup.contains(
            r#"<td style="border-top: 1px SOLID #000000; border-bottom: 1px SOLID #000000;"#
        ));
        assert!(markup.contains("font-family: Arial;"));
    }

    #[test]
    fn test_render_page() {
        let mut ws = Worksheet::new("Q&A");
        ws.set_cell_value("A1", 1.0).unwrap();

        let page = render_page(&ws, "report");
        assert!(page.starts_with("<!DOCTYPE html>\n<html>\n<head>"));
        assert!(page.contains("<title>Q&amp;A - report</title>"));
        assert!(page.contains("<h1>Sheet: Q&amp;A</h1>"));
        assert!(page.contains(".bordered-centered {"));
        assert!(page.ends_with("</div>\n</body>\n</html>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">O'Neil & co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;O&#x27;Neil &amp; co&lt;/a&gt;"
        );
    }
}
