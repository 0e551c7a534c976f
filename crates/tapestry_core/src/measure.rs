//! Measurement and text shaping seams
//!
//! Both are external collaborators: the engine asks them for sizes and never
//! lays out text itself.

use crate::geometry::{Color, Size};
use crate::tree::{NodeId, PlatformTree, StyleProp};

/// Measures retained nodes in device-independent pixels.
///
/// Returns `None` when the node cannot be measured yet (for instance a
/// detached node on a platform that only measures attached content).
pub trait Measure {
    fn measure(&self, tree: &dyn PlatformTree, node: NodeId) -> Option<Size>;
}

/// Measures a node by its explicit pixel width and height styles.
#[derive(Clone, Copy, Debug, Default)]
pub struct StyleMeasure;

impl Measure for StyleMeasure {
    fn measure(&self, tree: &dyn PlatformTree, node: NodeId) -> Option<Size> {
        let width = tree.style(node, StyleProp::Width)?.as_px()?;
        let height = tree.style(node, StyleProp::Height)?.as_px()?;
        let size = Size::new(width, height);
        size.is_usable().then_some(size)
    }
}

impl<F> Measure for F
where
    F: Fn(&dyn PlatformTree, NodeId) -> Option<Size>,
{
    fn measure(&self, tree: &dyn PlatformTree, node: NodeId) -> Option<Size> {
        self(tree, node)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text
// ─────────────────────────────────────────────────────────────────────────────

/// Font attributes for collage text and shaped markup
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Preferred typefaces, most preferred first
    pub typeface: Vec<String>,
    /// Font size in pixels
    pub height: Option<f32>,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            typeface: Vec::new(),
            height: None,
            color: Color::BLACK,
            bold: false,
            italic: false,
        }
    }
}

impl TextStyle {
    pub const DEFAULT_HEIGHT: f32 = 12.0;

    pub fn new(height: f32) -> Self {
        Self {
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_typeface(mut self, family: impl Into<String>) -> Self {
        self.typeface.push(family.into());
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Font size, falling back to the default height
    pub fn font_size(&self) -> f32 {
        self.height.unwrap_or(Self::DEFAULT_HEIGHT)
    }

    /// Canvas font shorthand, e.g. `"italic bold 14px Georgia,serif"`
    pub fn font_string(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if self.italic {
            parts.push("italic".to_string());
        }
        if self.bold {
            parts.push("bold".to_string());
        }
        parts.push(format!("{}px", self.font_size()));
        if self.typeface.is_empty() {
            parts.push("sans-serif".to_string());
        } else {
            parts.push(self.typeface.join(","));
        }
        parts.join(" ")
    }
}

/// Text converted to platform markup, with its measured box
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedText {
    pub markup: String,
    pub size: Size,
}

/// Converts text plus font attributes into markup and a measured size
pub trait TextShaper {
    fn shape(&self, text: &str, style: &TextStyle) -> ShapedText;
}

/// Shaper that assumes a fixed advance per character and escapes markup.
#[derive(Clone, Copy, Debug)]
pub struct MonospaceShaper {
    /// Glyph advance as a fraction of the font size
    pub advance: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
}

impl Default for MonospaceShaper {
    fn default() -> Self {
        Self {
            advance: 0.5,
            line_height: 1.25,
        }
    }
}

impl TextShaper for MonospaceShaper {
    fn shape(&self, text: &str, style: &TextStyle) -> ShapedText {
        let size = style.font_size();
        let lines: Vec<&str> = text.split('\n').collect();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut escaped = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '&' => escaped.push_str("&amp;"),
                '"' => escaped.push_str("&quot;"),
                '\n' => escaped.push_str("<br/>"),
                c => escaped.push(c),
            }
        }

        ShapedText {
            markup: format!(
                "<span style=\"font:{}\">{}</span>",
                style.font_string(),
                escaped
            ),
            size: Size::new(
                (longest as f32 * size * self.advance).ceil(),
                (lines.len() as f32 * size * self.line_height).ceil(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_string() {
        let style = TextStyle::new(14.0).bold().italic().with_typeface("Georgia").with_typeface("serif");
        assert_eq!(style.font_string(), "italic bold 14px Georgia,serif");
        assert_eq!(TextStyle::default().font_string(), "12px sans-serif");
    }

    #[test]
    fn test_monospace_shaper_escapes_and_sizes() {
        let shaped = MonospaceShaper::default().shape("a<b\nxy", &TextStyle::new(10.0));
        assert!(shaped.markup.contains("a&lt;b<br/>xy"));
        assert_eq!(shaped.size, Size::new(15.0, 25.0));
    }
}
