//! The reasoning capability the reconciler depends on

use crate::error::ReconcileResult;
use crate::window::RowWindow;

/// Everything the backend sees for one window
#[derive(Debug, Clone, Copy)]
pub struct WindowRequest<'a> {
    /// Full rendered markup of the sheet
    pub markup: &'a str,
    /// Full source text to reconcile against
    pub source_text: &'a str,
    /// Rows the response may touch
    pub window: RowWindow,
}

/// Proposes cell patches for one row window.
///
/// Implementations return the raw response text; the reconciler extracts
/// and validates the patch array itself.
pub trait ReasoningBackend {
    fn propose(&mut self, request: &WindowRequest<'_>) -> ReconcileResult<String>;
}

impl<B: ReasoningBackend + ?Sized> ReasoningBackend for &mut B {
    fn propose(&mut self, request: &WindowRequest<'_>) -> ReconcileResult<String> {
        (**self).propose(request)
    }
}

impl<B: ReasoningBackend + ?Sized> ReasoningBackend for Box<B> {
    fn propose(&mut self, request: &WindowRequest<'_>) -> ReconcileResult<String> {
        (**self).propose(request)
    }
}

/// Instruction text for a window
pub fn build_prompt(request: &WindowRequest<'_>) -> String {
    let RowWindow { start, end, .. } = request.window;
    format!(
        r#"You are filling in a spreadsheet from source material.

The spreadsheet is given as an HTML table. Column headers carry ids col1, col2, ...
for columns A, B, ...; row headers carry ids row1, row2, ... for rows 1, 2, ...
Together they give every cell an Excel-style reference such as B3.

## HTML table
{markup}

## Source text
{text}

## Row range
Rows {start} to {end}.

## Task
Read the whole table for context (headers, row labels, neighbouring values), then
find the cells in rows {start} to {end} that should receive a value from the source
text. That includes:
- empty cells, or cells holding only whitespace or a placeholder such as "___",
  "???", "N/A", "TBD", "-", "Pending";
- cells whose text asks for input ("Enter value here", "insert total");
- cells whose content is an obvious stand-in, example or default, or conflicts
  with its column header or row label.

For each such cell where the source text holds a better value, propose it. Match
on meaning and data type. Do not propose cells that are already correct, and do
not propose cells outside rows {start} to {end}. Do not skip any row in that range.

## Output
Return ONLY a JSON array, no other text:
[
  {{"cell_reference": "B3", "value": "value taken from the source text", "context": "which header/label it matches and why the current content is wrong"}}
]
Use double quotes for all strings. Return [] when nothing in the range needs a value."#,
        markup = request.markup,
        text = request.source_text,
        start = start,
        end = end,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_inputs() {
        let request = WindowRequest {
            markup: "<table id=\"t\"></table>",
            source_text: "Revenue 2024: 1,234",
            window: RowWindow {
                index: 2,
                start: 31,
                end: 60,
            },
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("<table id=\"t\"></table>"));
        assert!(prompt.contains("Revenue 2024: 1,234"));
        assert!(prompt.contains("Rows 31 to 60."));
        assert!(prompt.contains(r#"{"cell_reference": "B3""#));
    }

    struct Echo;

    impl ReasoningBackend for Echo {
        fn propose(&mut self, request: &WindowRequest<'_>) -> ReconcileResult<String> {
            Ok(format!("{}-{}", request.window.start, request.window.end))
        }
    }

    #[test]
    fn test_boxed_backend() {
        let mut backend: Box<dyn ReasoningBackend> = Box::new(Echo);
        let request = WindowRequest {
            markup: "",
            source_text: "",
            window: RowWindow {
                index: 1,
                start: 1,
                end: 5,
            },
        };
        assert_eq!(backend.propose(&request).unwrap(), "1-5");
    }
}
