//! File naming shared by rendering and patch matching

use std::collections::HashSet;

/// Reduce a sheet name to a filename-safe token.
///
/// Whitespace and `. ( ) , -` become `_`, any other non-alphanumeric
/// character is dropped, runs of `_` collapse and leading or trailing `_`
/// are trimmed. A name with nothing left becomes `sheet`.
///
/// ```
/// use sheetfill::naming::sanitize_sheet_name;
///
/// assert_eq!(sanitize_sheet_name("revenue forecast"), "revenue_forecast");
/// assert_eq!(sanitize_sheet_name("1. Fic. amounts (patenting) "), "1_Fic_amounts_patenting");
/// ```
pub fn sanitize_sheet_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        let mapped = if c.is_alphanumeric() {
            c
        } else if c == '_' || c.is_whitespace() || matches!(c, '.' | '(' | ')' | ',' | '-') {
            '_'
        } else {
            continue;
        };
        if mapped == '_' && (out.is_empty() || out.ends_with('_')) {
            continue;
        }
        out.push(mapped);
    }
    while out.ends_with('_') {
        out.pop();
    }

    if out.is_empty() {
        "sheet".to_string()
    } else {
        out
    }
}

/// `{workbook_base}_{sanitized sheet}`, the stem of every per-sheet file
pub fn patch_stem(workbook_base: &str, sheet_name: &str) -> String {
    format!("{}_{}", workbook_base, sanitize_sheet_name(sheet_name))
}

/// Stems for a workbook's sheets, in sheet order.
///
/// When two sheets sanitize to the same stem the first one keeps it and the
/// later ones are left out.
pub fn unique_stems<'a, I>(workbook_base: &str, sheet_names: I) -> Vec<(&'a str, String)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut stems = Vec::new();
    for name in sheet_names {
        let stem = patch_stem(workbook_base, name);
        if seen.insert(stem.clone()) {
            stems.push((name, stem));
        } else {
            tracing::warn!(workbook = workbook_base, sheet = name, stem = %stem, "sheet name collides with an earlier sheet, skipping");
        }
    }
    stems
}
