//! Text alignment types

/// Text alignment settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    /// Horizontal alignment
    pub horizontal: HorizontalAlignment,
    /// Vertical alignment
    pub vertical: VerticalAlignment,
    /// Wrap text
    pub wrap_text: bool,
}

impl Alignment {
    /// Create a new default alignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set horizontal alignment
    pub fn with_horizontal(mut self, align: HorizontalAlignment) -> Self {
        self.horizontal = align;
        self
    }

    /// Set vertical alignment
    pub fn with_vertical(mut self, align: VerticalAlignment) -> Self {
        self.vertical = align;
        self
    }

    /// Enable text wrapping
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap_text = wrap;
        self
    }

    /// True for the spreadsheet default: general/left, bottom, no wrap
    pub fn is_plain(&self) -> bool {
        matches!(
            self.horizontal,
            HorizontalAlignment::General | HorizontalAlignment::Left
        ) && self.vertical == VerticalAlignment::Bottom
            && !self.wrap_text
    }
}

/// Horizontal alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// General alignment (nothing stated in the file)
    #[default]
    General,
    /// Left aligned
    Left,
    /// Center aligned
    Center,
    /// Right aligned
    Right,
    /// Fill (repeat content to fill cell width)
    Fill,
    /// Justify (stretch to fit width)
    Justify,
    /// Center across selection
    CenterContinuous,
    /// Distributed
    Distributed,
}

impl HorizontalAlignment {
    /// Parse the `horizontal` attribute of an `<alignment>` element
    pub fn from_xlsx(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Self::General),
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "fill" => Some(Self::Fill),
            "justify" => Some(Self::Justify),
            "centerContinuous" => Some(Self::CenterContinuous),
            "distributed" => Some(Self::Distributed),
            _ => None,
        }
    }

    /// Attribute value, `None` for general
    pub fn as_xlsx(&self) -> Option<&'static str> {
        match self {
            Self::General => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
            Self::Fill => Some("fill"),
            Self::Justify => Some("justify"),
            Self::CenterContinuous => Some("centerContinuous"),
            Self::Distributed => Some("distributed"),
        }
    }
}

/// Vertical alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    /// Top aligned
    Top,
    /// Center aligned
    Center,
    /// Bottom aligned (default)
    #[default]
    Bottom,
    /// Justify
    Justify,
    /// Distributed
    Distributed,
}

impl VerticalAlignment {
    /// Parse the `vertical` attribute of an `<alignment>` element
    pub fn from_xlsx(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Self::Top),
            "center" => Some(Self::Center),
            "bottom" => Some(Self::Bottom),
            "justify" => Some(Self::Justify),
            "distributed" => Some(Self::Distributed),
            _ => None,
        }
    }

    /// Attribute value, `None` for the bottom default
    pub fn as_xlsx(&self) -> Option<&'static str> {
        match self {
            Self::Top => Some("top"),
            Self::Center => Some("center"),
            Self::Bottom => None,
            Self::Justify => Some("justify"),
            Self::Distributed => Some("distributed"),
        }
    }
}
