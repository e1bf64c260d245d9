//! Small helpers shared by the XML readers and writers

use quick_xml::events::BytesStart;
use sheetfill_core::CellAddress;

/// Escape text for use in element content or attribute values
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Unescaped value of an attribute, if present and well formed
pub(crate) fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Attribute parsed with `FromStr`
pub(crate) fn attr_parse<T: std::str::FromStr>(e: &BytesStart<'_>, name: &[u8]) -> Option<T> {
    attr(e, name).and_then(|v| v.parse().ok())
}

/// Decode the `_xHHHH_` escapes Excel uses for control characters in
/// string content.
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("_x") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &candidate[7..];
            }
            None => {
                out.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Position of `<row>`/`<c>` elements, including ones that omit `r`
#[derive(Debug, Default)]
pub(crate) struct RowCursor {
    row: u32,
    next_col: u16,
    started: bool,
}

impl RowCursor {
    /// Enter a `<row>`; returns its 0-based index
    pub(crate) fn enter_row(&mut self, r: Option<u32>) -> u32 {
        self.row = match r {
            Some(r) if r >= 1 => r - 1,
            _ if self.started => self.row + 1,
            _ => 0,
        };
        self.started = true;
        self.next_col = 0;
        self.row
    }

    /// Position of a `<c>`; `None` when its `r` does not parse
    pub(crate) fn locate(&mut self, reference: Option<&str>) -> Option<CellAddress> {
        let addr = match reference {
            Some(r) => CellAddress::parse(r).ok()?,
            None => CellAddress::new(self.row, self.next_col),
        };
        self.row = addr.row;
        self.next_col = addr.col.saturating_add(1);
        Some(addr)
    }
}
