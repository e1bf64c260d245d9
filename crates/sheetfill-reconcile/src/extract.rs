//! Pulling the patch array out of a free-form backend response

use serde_json::Value;

use crate::error::{ReconcileError, ReconcileResult};
use crate::patch::CellPatch;

/// Parse the patches in a backend response.
///
/// The array is taken from the first `[` through the last `]`; without
/// brackets the whole body is parsed. A response that yields no JSON array
/// (or single object) is an error. Array elements that are not patch
/// objects are skipped with a warning.
pub fn extract_patches(response: &str) -> ReconcileResult<Vec<CellPatch>> {
    let body = match (response.find('['), response.rfind(']')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => response.trim(),
    };

    let items = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(obj @ Value::Object(_)) => vec![obj],
        Ok(other) => {
            return Err(ReconcileError::Extract(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )))
        }
        Err(e) => return Err(ReconcileError::Extract(e.to_string())),
    };

    let mut patches = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<CellPatch>(item) {
            Ok(patch) => patches.push(patch),
            Err(e) => tracing::warn!(index = i, error = %e, "skipping malformed patch entry"),
        }
    }
    Ok(patches)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_array_inside_prose() {
        let response = "Here are the cells:\n```json\n[{\"cell_reference\": \"B2\", \"value\": \"1,234\", \"context\": \"total\"}]\n```\nDone.";
        let patches = extract_patches(response).unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].cell_reference, "B2");
        assert_eq!(patches[0].value, Some(PatchValue::Text("1,234".into())));
    }

    #[test]
    fn test_empty_array() {
        assert!(extract_patches("[]").unwrap().is_empty());
    }

    #[test]
    fn test_single_object_body() {
        let patches = extract_patches(r#"{"cell_reference": "C3", "value": 7}"#).unwrap();
        assert_eq!(patches, vec![CellPatch::new("C3", PatchValue::Integer(7))]);
    }

    #[test]
    fn test_prose_only_fails() {
        let err = extract_patches("I could not find anything to fill in.").unwrap_err();
        assert!(matches!(err, ReconcileError::Extract(_)));
    }

    #[test]
    fn test_broken_json_fails() {
        assert!(extract_patches(r#"[{"cell_reference": "A1", "value": ]"#).is_err());
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let patches = extract_patches(
            r#"[{"cell_reference": "A1", "value": 1}, "junk", {"value": 2}, {"cell_reference": 5}]"#,
        )
        .unwrap();
        assert_eq!(patches, vec![CellPatch::new("A1", PatchValue::Integer(1))]);
    }
}
