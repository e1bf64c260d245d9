//! Style equivalence classes
//!
//! Most cells of a typical sheet share one of a handful of looks. Those get a
//! short `class` attribute; everything else carries its own inline CSS.

use std::fmt;

use sheetfill_core::{
    format_number, BorderEdge, BorderLineStyle, HorizontalAlignment, Style, VerticalAlignment,
};

/// Named look shared by many cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleClass {
    /// Borderless, left/general aligned, Calibri 9pt
    Plain9,
    /// Borderless, left/general aligned, Calibri 11pt
    Plain11,
    /// Thin box on all four sides, centered, Calibri 9pt
    BorderedCentered,
}

impl StyleClass {
    /// CSS class name
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleClass::Plain9 => "plain-9",
            StyleClass::Plain11 => "plain-11",
            StyleClass::BorderedCentered => "bordered-centered",
        }
    }
}

impl fmt::Display for StyleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a cell's look is expressed in markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellStyle {
    Class(StyleClass),
    Inline(String),
}

type StylePredicate = fn(&Style) -> bool;

/// Classification rules, tried in order; the first match wins
pub static STYLE_RULES: [(StyleClass, StylePredicate); 3] = [
    (StyleClass::Plain9, is_plain_9),
    (StyleClass::Plain11, is_plain_11),
    (StyleClass::BorderedCentered, is_bordered_centered),
];

/// Map a cell style to a class, or to inline CSS when no rule matches
pub fn classify(style: &Style) -> CellStyle {
    STYLE_RULES
        .iter()
        .find(|(_, matches)| matches(style))
        .map(|(class, _)| CellStyle::Class(*class))
        .unwrap_or_else(|| CellStyle::Inline(inline_css(style)))
}

fn calibri_at(style: &Style, points: f64) -> bool {
    style.font.family_is("Calibri") && style.font.size_is(points) && !style.font.bold
}

fn bottom_unwrapped(style: &Style) -> bool {
    style.alignment.vertical == VerticalAlignment::Bottom && !style.alignment.wrap_text
}

fn borderless_left(style: &Style) -> bool {
    style.border.is_empty()
        && matches!(
            style.alignment.horizontal,
            HorizontalAlignment::General | HorizontalAlignment::Left
        )
        && bottom_unwrapped(style)
}

fn is_plain_9(style: &Style) -> bool {
    borderless_left(style) && calibri_at(style, 9.0)
}

fn is_plain_11(style: &Style) -> bool {
    borderless_left(style) && calibri_at(style, 11.0)
}

fn is_bordered_centered(style: &Style) -> bool {
    style.border.is_uniform(BorderLineStyle::Thin)
        && style.alignment.horizontal == HorizontalAlignment::Center
        && bottom_unwrapped(style)
        && calibri_at(style, 9.0)
}

/// CSS declarations for a style that matched no class
pub fn inline_css(style: &Style) -> String {
    let border = &style.border;
    let mut decls: Vec<(&str, String)> = vec![
        ("border-top", border_css(&border.top)),
        ("border-bottom", border_css(&border.bottom)),
        ("border-left", border_css(&border.left)),
        ("border-right", border_css(&border.right)),
    ];

    let text_align = match style.alignment.horizontal {
        HorizontalAlignment::Center => "center",
        HorizontalAlignment::Right => "right",
        _ => "left",
    };
    let vertical_align = match style.alignment.vertical {
        VerticalAlignment::Center => "middle",
        VerticalAlignment::Top => "top",
        _ => "bottom",
    };
    decls.push(("text-align", text_align.into()));
    decls.push(("vertical-align", vertical_align.into()));

    if style.alignment.wrap_text {
        decls.push(("white-space", "normal".into()));
        decls.push(("overflow", "hidden".into()));
        decls.push(("word-wrap", "break-word".into()));
    } else {
        decls.push(("white-space", "nowrap".into()));
    }

    let font = &style.font;
    if let Some(name) = font.name.as_deref().filter(|n| !n.is_empty()) {
        decls.push(("font-family", name.to_string()));
    }
    if let Some(size) = font.size.filter(|s| *s != 0.0) {
        decls.push(("font-size", format!("{}pt", format_number(size))));
    }
    if font.bold {
        decls.push(("font-weight", "bold".into()));
    }

    decls.push(("color", "#000000".into()));
    decls.push(("direction", "ltr".into()));
    decls.push(("padding", "0px 3px 0px 3px".into()));

    decls
        .iter()
        .map(|(prop, value)| format!("{}: {}", prop, value))
        .collect::<Vec<_>>()
        .join("; ")
}

fn border_css(edge: &Option<BorderEdge>) -> String {
    let Some(edge) = edge else {
        return "transparent".into();
    };
    let line = match edge.style {
        BorderLineStyle::Thin | BorderLineStyle::Hair => "1px SOLID",
        BorderLineStyle::Medium => "2px SOLID",
        BorderLineStyle::Thick => "3px SOLID",
        BorderLineStyle::Double => "3px DOUBLE",
        BorderLineStyle::Dotted => "1px DOTTED",
        BorderLineStyle::Dashed
        | BorderLineStyle::DashDot
        | BorderLineStyle::DashDotDot
        | BorderLineStyle::SlantDashDot => "1px DASHED",
        _ => "1px SOLID",
    };
    format!("{} #000000", line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetfill_core::BorderStyle;

    fn calibri(size: f64) -> Style {
        Style::new().font_name("Calibri").font_size(size)
    }

    #[test]
    fn test_unset_style_is_plain_9() {
        assert_eq!(classify(&Style::new()), CellStyle::Class(StyleClass::Plain9));
        assert_eq!(classify(&calibri(9.0)), CellStyle::Class(StyleClass::Plain9));
        assert_eq!(
            classify(&calibri(9.0).horizontal_alignment(HorizontalAlignment::Left)),
            CellStyle::Class(StyleClass::Plain9)
        );
    }

    #[test]
    fn test_plain_11() {
        assert_eq!(classify(&calibri(11.0)), CellStyle::Class(StyleClass::Plain11));
        assert_eq!(
            classify(&Style::new().font_size(11.0)),
            CellStyle::Class(StyleClass::Plain11)
        );
    }

    #[test]
    fn test_bordered_centered() {
        let style = calibri(9.0)
            .border(BorderStyle::all(BorderLineStyle::Thin))
            .horizontal_alignment(HorizontalAlignment::Center);
        assert_eq!(
            classify(&style),
            CellStyle::Class(StyleClass::BorderedCentered)
        );

        let three_sides = calibri(9.0)
            .border(
                BorderStyle::new()
                    .with_top(BorderLineStyle::Thin)
                    .with_bottom(BorderLineStyle::Thin)
                    .with_left(BorderLineStyle::Thin),
            )
            .horizontal_alignment(HorizontalAlignment::Center);
        assert!(matches!(classify(&three_sides), CellStyle::Inline(_)));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // unset size satisfies both plain rules
        let style = Style::new().font_name("Calibri");
        assert!(is_plain_9(&style) && is_plain_11(&style));
        assert_eq!(classify(&style), CellStyle::Class(StyleClass::Plain9));
    }

    #[test]
    fn test_inline_css_declaration_order() {
        let style = Style::new()
            .font_name("Arial")
            .font_size(12.0)
            .bold(true)
            .border(
                BorderStyle::new()
                    .with_top(BorderLineStyle::Medium)
                    .with_right(BorderLineStyle::Dotted),
            )
            .horizontal_alignment(HorizontalAlignment::Right)
            .vertical_alignment(VerticalAlignment::Center)
            .wrap_text(true);

        assert_eq!(
            classify(&style),
            CellStyle::Inline(
                "border-top: 2px SOLID #000000; border-bottom: transparent; \
                 border-left: transparent; border-right: 1px DOTTED #000000; \
                 text-align: right; vertical-align: middle; white-space: normal; \
                 overflow: hidden; word-wrap: break-word; font-family: Arial; \
                 font-size: 12pt; font-weight: bold; color: #000000; direction: ltr; \
                 padding: 0px 3px 0px 3px"
                    .into()
            )
        );
    }

    #[test]
    fn test_inline_css_defaults() {
        let style = Style::new().font_name("Verdana");
        assert_eq!(
            inline_css(&style),
            "border-top: transparent; border-bottom: transparent; border-left: transparent; \
             border-right: transparent; text-align: left; vertical-align: bottom; \
             white-space: nowrap; font-family: Verdana; color: #000000; direction: ltr; \
             padding: 0px 3px 0px 3px"
        );
    }

    #[test]
    fn test_border_line_table() {
        let css = |s| border_css(&Some(BorderEdge::new(s)));
        assert_eq!(css(BorderLineStyle::Hair), "1px SOLID #000000");
        assert_eq!(css(BorderLineStyle::Thick), "3px SOLID #000000");
        assert_eq!(css(BorderLineStyle::Double), "3px DOUBLE #000000");
        assert_eq!(css(BorderLineStyle::SlantDashDot), "1px DASHED #000000");
        assert_eq!(css(BorderLineStyle::MediumDashed), "1px SOLID #000000");
        assert_eq!(css(BorderLineStyle::Unrecognized), "1px SOLID #000000");
        assert_eq!(border_css(&None), "transparent");
    }
}
