//! Border style types

/// Border style for a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BorderStyle {
    /// Left border
    pub left: Option<BorderEdge>,
    /// Right border
    pub right: Option<BorderEdge>,
    /// Top border
    pub top: Option<BorderEdge>,
    /// Bottom border
    pub bottom: Option<BorderEdge>,
}

impl BorderStyle {
    /// Create a new border style with no borders
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all four sides to the same line style
    pub fn all(style: BorderLineStyle) -> Self {
        let edge = Some(BorderEdge::new(style));
        Self {
            left: edge.clone(),
            right: edge.clone(),
            top: edge.clone(),
            bottom: edge,
        }
    }

    /// Set the left border
    pub fn with_left(mut self, style: BorderLineStyle) -> Self {
        self.left = Some(BorderEdge::new(style));
        self
    }

    /// Set the right border
    pub fn with_right(mut self, style: BorderLineStyle) -> Self {
        self.right = Some(BorderEdge::new(style));
        self
    }

    /// Set the top border
    pub fn with_top(mut self, style: BorderLineStyle) -> Self {
        self.top = Some(BorderEdge::new(style));
        self
    }

    /// Set the bottom border
    pub fn with_bottom(mut self, style: BorderLineStyle) -> Self {
        self.bottom = Some(BorderEdge::new(style));
        self
    }

    /// Sides in top, bottom, left, right order
    pub fn sides(&self) -> [&Option<BorderEdge>; 4] {
        [&self.top, &self.bottom, &self.left, &self.right]
    }

    /// Check if no side has a visible line
    pub fn is_empty(&self) -> bool {
        self.sides().iter().all(|s| s.is_none())
    }

    /// Check if all four sides are present and use `style`
    pub fn is_uniform(&self, style: BorderLineStyle) -> bool {
        self.sides()
            .iter()
            .all(|s| s.as_ref().map_or(false, |e| e.style == style))
    }
}

/// A single border edge
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BorderEdge {
    /// Line style
    pub style: BorderLineStyle,
}

impl BorderEdge {
    /// Create a new border edge
    pub fn new(style: BorderLineStyle) -> Self {
        Self { style }
    }

    /// Create a thin border
    pub fn thin() -> Self {
        Self::new(BorderLineStyle::Thin)
    }
}

/// Border line styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderLineStyle {
    /// Thin line
    Thin,
    /// Medium line
    Medium,
    /// Thick line
    Thick,
    /// Dashed line
    Dashed,
    /// Dotted line
    Dotted,
    /// Double line
    Double,
    /// Hair line (very thin)
    Hair,
    /// Medium dashed
    MediumDashed,
    /// Dash-dot
    DashDot,
    /// Medium dash-dot
    MediumDashDot,
    /// Dash-dot-dot
    DashDotDot,
    /// Medium dash-dot-dot
    MediumDashDotDot,
    /// Slant dash-dot
    SlantDashDot,
    /// A style name this model does not know
    Unrecognized,
}

impl BorderLineStyle {
    /// Parse the `style` attribute of a border edge.
    ///
    /// Returns `None` for "none" (no visible line); unknown names map to
    /// [`BorderLineStyle::Unrecognized`].
    pub fn from_xlsx(s: &str) -> Option<Self> {
        let style = match s {
            "none" | "" => return None,
            "thin" => Self::Thin,
            "medium" => Self::Medium,
            "thick" => Self::Thick,
            "dashed" => Self::Dashed,
            "dotted" => Self::Dotted,
            "double" => Self::Double,
            "hair" => Self::Hair,
            "mediumDashed" => Self::MediumDashed,
            "dashDot" => Self::DashDot,
            "mediumDashDot" => Self::MediumDashDot,
            "dashDotDot" => Self::DashDotDot,
            "mediumDashDotDot" => Self::MediumDashDotDot,
            "slantDashDot" => Self::SlantDashDot,
            _ => Self::Unrecognized,
        };
        Some(style)
    }

    /// Attribute value used when writing the style back out
    pub fn as_xlsx(&self) -> &'static str {
        match self {
            Self::Thin | Self::Unrecognized => "thin",
            Self::Medium => "medium",
            Self::Thick => "thick",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Double => "double",
            Self::Hair => "hair",
            Self::MediumDashed => "mediumDashed",
            Self::DashDot => "dashDot",
            Self::MediumDashDot => "mediumDashDot",
            Self::DashDotDot => "dashDotDot",
            Self::MediumDashDotDot => "mediumDashDotDot",
            Self::SlantDashDot => "slantDashDot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_xlsx() {
        assert_eq!(BorderLineStyle::from_xlsx("none"), None);
        assert_eq!(
            BorderLineStyle::from_xlsx("thin"),
            Some(BorderLineStyle::Thin)
        );
        assert_eq!(
            BorderLineStyle::from_xlsx("wavy"),
            Some(BorderLineStyle::Unrecognized)
        );
    }

    #[test]
    fn test_uniform() {
        assert!(BorderStyle::all(BorderLineStyle::Thin).is_uniform(BorderLineStyle::Thin));
        assert!(!BorderStyle::new()
            .with_top(BorderLineStyle::Thin)
            .is_uniform(BorderLineStyle::Thin));
        assert!(BorderStyle::new().is_empty());
    }
}
