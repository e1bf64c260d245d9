//! Font style types

/// Font style settings
///
/// Family and size are optional so that a font record which never states
/// them can be told apart from one that explicitly says "Calibri, 11pt".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontStyle {
    /// Font family name (e.g., "Calibri", "Arial")
    pub name: Option<String>,
    /// Font size in points
    pub size: Option<f64>,
    /// Bold
    pub bold: bool,
}

impl FontStyle {
    /// Create a font with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font name
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set font size
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// True when the family is unset or equal to `family`
    pub fn family_is(&self, family: &str) -> bool {
        self.name.as_deref().map_or(true, |n| n == family)
    }

    /// True when the size is unset or equal to `points`
    pub fn size_is(&self, points: f64) -> bool {
        self.size.map_or(true, |s| s == points)
    }
}

impl std::hash::Hash for FontStyle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.map(f64::to_bits).hash(state);
        self.bold.hash(state);
    }
}

impl Eq for FontStyle {}
