//! Cell value types

use std::fmt;

/// Represents the value stored in a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Numeric value (all numbers stored as f64, including dates)
    Number(f64),

    /// String value
    String(String),

    /// Error value as written in the file (#VALUE!, #REF!, etc.)
    Error(String),

    /// Formula with its last cached result
    Formula {
        /// Formula text without the leading '='
        text: String,
        /// Cached value stored alongside the formula, if any
        cached_value: Option<Box<CellValue>>,
    },
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Check if the cell is empty
    ///
    /// A formula without a cached result counts as empty, matching how the
    /// cell reads when opened for values only.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Formula { cached_value, .. } => {
                cached_value.as_deref().map_or(true, CellValue::is_empty)
            }
            _ => false,
        }
    }

    /// Check if the cell contains a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula { .. })
    }

    /// The value a reader sees: formulas resolve to their cached result
    pub fn resolved(&self) -> &CellValue {
        match self {
            CellValue::Formula {
                cached_value: Some(v),
                ..
            } => v.resolved(),
            CellValue::Formula { .. } => &CellValue::Empty,
            other => other,
        }
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self.resolved() {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a string
    pub fn as_string(&self) -> Option<&str> {
        match self.resolved() {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Format a number the way it reads in a spreadsheet: integral values
/// without a fractional part, everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolved() {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Error(e) => write!(f, "{}", e),
            CellValue::Formula { .. } => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(12.5).to_string(), "12.5");
        assert_eq!(CellValue::Number(-3.0).to_string(), "-3");
        assert_eq!(CellValue::Boolean(true).to_string(), "TRUE");
        assert_eq!(CellValue::string("x<y").to_string(), "x<y");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_formula_resolves_to_cached_value() {
        let v = CellValue::Formula {
            text: "SUM(A1:A3)".into(),
            cached_value: Some(Box::new(CellValue::Number(6.0))),
        };
        assert_eq!(v.as_number(), Some(6.0));
        assert_eq!(v.to_string(), "6");
        assert!(!v.is_empty());

        let uncached = CellValue::Formula {
            text: "NOW()".into(),
            cached_value: None,
        };
        assert!(uncached.is_empty());
    }

    #[test]
    fn test_large_numbers_keep_float_form() {
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.1), "0.1");
    }
}
