//! Layout elements
//!
//! A [`LayoutElement`] is an immutable, sized rectangle. Its mutable-looking
//! properties (size, opacity, background, tag, link) live on the element
//! itself; what it shows lives in a shared [`Content`] handle. Property
//! modifiers clone the handle, so the differ can tell "same content, new
//! properties" apart from a content change with a pointer comparison.
//!
//! # Example
//!
//! ```rust
//! use tapestry_layout::prelude::*;
//!
//! let a = spacer(10, 20);
//! let b = spacer(30, 5);
//! let column = above(a.clone(), b.clone());
//! assert_eq!(column.size(), (30, 25));
//!
//! let row = beside(a, b);
//! assert_eq!(row.size(), (40, 20));
//! ```

use std::rc::Rc;

use tapestry_core::{Color, TextShaper, TextStyle};

use crate::position::Position;
use crate::renderable::Renderable;

// ─────────────────────────────────────────────────────────────────────────────
// Content
// ─────────────────────────────────────────────────────────────────────────────

/// How an image fills its box
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageStyle {
    /// Stretched to the box
    Plain,
    /// Scaled to cover the box, centered
    Fitted,
    /// Scaled copy of the image, shifted so `(x, y)` is the top-left corner
    Cropped(i32, i32),
    /// Repeated at natural size
    Tiled,
}

/// Flow direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    /// Stacked on top of each other, first child on top
    Inward,
    /// Stacked on top of each other, last child on top
    Outward,
}

impl Direction {
    /// True when children are appended last to first
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::Up | Direction::Left | Direction::Inward)
    }

    /// Logical child indices in document order
    pub fn document_order(self, len: usize) -> impl Iterator<Item = usize> {
        let reversed = self.is_reversed();
        (0..len).map(move |i| if reversed { len - 1 - i } else { i })
    }
}

/// Horizontal alignment of markup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    Center,
    Justify,
}

/// What a layout element shows
#[derive(Debug)]
pub enum Content {
    Image {
        style: ImageStyle,
        /// Intrinsic size the style is computed against
        width: u32,
        height: u32,
        src: String,
    },
    Container {
        position: Position,
        child: LayoutElement,
    },
    Flow {
        direction: Direction,
        children: Vec<LayoutElement>,
    },
    Spacer,
    Markup {
        html: String,
        align: Option<TextAlign>,
    },
    Embedded(Box<dyn Renderable>),
}

impl Content {
    /// Variant name, for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            Content::Image { .. } => "image",
            Content::Container { .. } => "container",
            Content::Flow { .. } => "flow",
            Content::Spacer => "spacer",
            Content::Markup { .. } => "markup",
            Content::Embedded(_) => "embedded",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout Element
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable, sized layout rectangle
#[derive(Clone, Debug)]
pub struct LayoutElement {
    width: u32,
    height: u32,
    opacity: f32,
    color: Option<Color>,
    href: String,
    tag: String,
    content: Rc<Content>,
}

impl LayoutElement {
    /// Create an element with default properties
    pub fn new(width: u32, height: u32, content: Content) -> Self {
        Self {
            width,
            height,
            opacity: 1.0,
            color: None,
            href: String::new(),
            tag: String::new(),
            content: Rc::new(content),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// True when both elements share one content allocation
    pub fn same_content(&self, other: &LayoutElement) -> bool {
        Rc::ptr_eq(&self.content, &other.content)
    }

    /// Set the width. Images keep their aspect ratio.
    pub fn with_width(mut self, width: u32) -> Self {
        if let Content::Image {
            width: iw,
            height: ih,
            ..
        } = *self.content
        {
            if iw > 0 {
                self.height = (ih as f32 / iw as f32 * width as f32).round() as u32;
            }
        }
        self.width = width;
        self
    }

    /// Set the height. Images keep their aspect ratio.
    pub fn with_height(mut self, height: u32) -> Self {
        if let Content::Image {
            width: iw,
            height: ih,
            ..
        } = *self.content
        {
            if ih > 0 {
                self.width = (iw as f32 / ih as f32 * height as f32).round() as u32;
            }
        }
        self.height = height;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the opacity, clamped to `0.0..=1.0`
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the anchor tag other documents can link to
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Make the element a hyperlink; an empty target removes the link
    pub fn with_link(mut self, href: impl Into<String>) -> Self {
        self.href = href.into();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Constructors
// ─────────────────────────────────────────────────────────────────────────────

/// Empty space
pub fn spacer(width: u32, height: u32) -> LayoutElement {
    LayoutElement::new(width, height, Content::Spacer)
}

/// A 0x0 spacer
pub fn empty() -> LayoutElement {
    spacer(0, 0)
}

pub fn image(width: u32, height: u32, src: impl Into<String>) -> LayoutElement {
    image_with_style(ImageStyle::Plain, width, height, src)
}

pub fn fitted_image(width: u32, height: u32, src: impl Into<String>) -> LayoutElement {
    image_with_style(ImageStyle::Fitted, width, height, src)
}

pub fn tiled_image(width: u32, height: u32, src: impl Into<String>) -> LayoutElement {
    image_with_style(ImageStyle::Tiled, width, height, src)
}

/// A `width` x `height` window onto an image, with `(x, y)` at its top-left
pub fn cropped_image(
    (x, y): (i32, i32),
    width: u32,
    height: u32,
    src: impl Into<String>,
) -> LayoutElement {
    image_with_style(ImageStyle::Cropped(x, y), width, height, src)
}

fn image_with_style(
    style: ImageStyle,
    width: u32,
    height: u32,
    src: impl Into<String>,
) -> LayoutElement {
    LayoutElement::new(
        width,
        height,
        Content::Image {
            style,
            width,
            height,
            src: src.into(),
        },
    )
}

/// A `width` x `height` box holding `child` at `position`
pub fn container(
    width: u32,
    height: u32,
    position: Position,
    child: LayoutElement,
) -> LayoutElement {
    LayoutElement::new(width, height, Content::Container { position, child })
}

/// Lay children out one after another.
///
/// Sums sizes along the flow axis and takes the maximum across it. Stacking
/// directions take the maximum on both axes. No children gives [`empty`].
pub fn flow(direction: Direction, children: Vec<LayoutElement>) -> LayoutElement {
    if children.is_empty() {
        return empty();
    }

    let max_width = children.iter().map(|c| c.width).max().unwrap_or(0);
    let max_height = children.iter().map(|c| c.height).max().unwrap_or(0);
    let (width, height) = match direction {
        Direction::Up | Direction::Down => {
            (max_width, saturating_sum(children.iter().map(|c| c.height)))
        }
        Direction::Left | Direction::Right => {
            (saturating_sum(children.iter().map(|c| c.width)), max_height)
        }
        Direction::Inward | Direction::Outward => (max_width, max_height),
    };
    LayoutElement::new(width, height, Content::Flow { direction, children })
}

fn saturating_sum(sizes: impl Iterator<Item = u32>) -> u32 {
    sizes.fold(0, u32::saturating_add)
}

/// `top` stacked over `bottom`
pub fn above(top: LayoutElement, bottom: LayoutElement) -> LayoutElement {
    flow(Direction::Down, vec![top, bottom])
}

/// `bottom` stacked under `top`
pub fn below(bottom: LayoutElement, top: LayoutElement) -> LayoutElement {
    flow(Direction::Down, vec![top, bottom])
}

/// `left` next to `right`
pub fn beside(left: LayoutElement, right: LayoutElement) -> LayoutElement {
    flow(Direction::Right, vec![left, right])
}

/// Elements layered on top of each other, last on top
pub fn layers(children: Vec<LayoutElement>) -> LayoutElement {
    flow(Direction::Outward, children)
}

/// Raw markup in a fixed box
pub fn markup(width: u32, height: u32, html: impl Into<String>) -> LayoutElement {
    LayoutElement::new(
        width,
        height,
        Content::Markup {
            html: html.into(),
            align: None,
        },
    )
}

/// Shaped text, sized to its measured box
pub fn text(shaper: &dyn TextShaper, content: &str, style: &TextStyle) -> LayoutElement {
    shaped(shaper, content, style, None)
}

/// Shaped text with explicit alignment
pub fn aligned_text(
    shaper: &dyn TextShaper,
    content: &str,
    style: &TextStyle,
    align: TextAlign,
) -> LayoutElement {
    shaped(shaper, content, style, Some(align))
}

fn shaped(
    shaper: &dyn TextShaper,
    content: &str,
    style: &TextStyle,
    align: Option<TextAlign>,
) -> LayoutElement {
    let shaped = shaper.shape(content, style);
    let width = shaped.size.width.max(0.0).ceil() as u32;
    let height = shaped.size.height.max(0.0).ceil() as u32;
    LayoutElement::new(
        width,
        height,
        Content::Markup {
            html: shaped.markup,
            align,
        },
    )
}

/// Embed any renderable in a `width` x `height` box
pub fn embedded(width: u32, height: u32, renderable: impl Renderable + 'static) -> LayoutElement {
    LayoutElement::new(width, height, Content::Embedded(Box::new(renderable)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapestry_core::MonospaceShaper;

    #[test]
    fn test_flow_sizes_along_and_across() {
        let kids = vec![spacer(10, 5), spacer(20, 15), spacer(30, 10)];

        let row = flow(Direction::Right, kids.clone());
        assert_eq!(row.size(), (60, 15));

        let column = flow(Direction::Down, kids.clone());
        assert_eq!(column.size(), (30, 30));

        let stack = flow(Direction::Inward, kids);
        assert_eq!(stack.size(), (30, 15));
    }

    #[test]
    fn test_huge_flows_saturate() {
        let row = flow(Direction::Right, vec![spacer(u32::MAX, 1), spacer(2, 3)]);
        assert_eq!(row.size(), (u32::MAX, 3));

        let column = flow(Direction::Up, vec![spacer(1, u32::MAX - 1), spacer(1, u32::MAX)]);
        assert_eq!(column.size(), (1, u32::MAX));
    }

    #[test]
    fn test_empty_flow_is_empty() {
        let e = flow(Direction::Left, Vec::new());
        assert_eq!(e.size(), (0, 0));
        assert!(matches!(e.content(), Content::Spacer));
    }

    #[test]
    fn test_stacking_helpers() {
        let a = spacer(10, 20);
        let b = spacer(30, 5);
        assert_eq!(above(a.clone(), b.clone()).height(), 25);
        assert_eq!(below(a.clone(), b.clone()).height(), 25);
        assert_eq!(beside(a.clone(), b.clone()).width(), 40);
        assert_eq!(layers(vec![a, b]).size(), (30, 20));
    }

    #[test]
    fn test_below_puts_second_argument_first() {
        let e = below(spacer(1, 1), spacer(2, 2));
        match e.content() {
            Content::Flow { children, .. } => assert_eq!(children[0].width(), 2),
            other => panic!("expected flow, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_modifiers_share_content() {
        let base = spacer(10, 10);
        let styled = base.clone().with_opacity(0.5).with_color(Color::RED).with_tag("x");
        assert!(base.same_content(&styled));
        assert!(!base.same_content(&spacer(10, 10)));
    }

    #[test]
    fn test_image_width_keeps_aspect() {
        let img = image(200, 100, "a.png").with_width(50);
        assert_eq!(img.size(), (50, 25));

        let img = image(200, 100, "a.png").with_height(50);
        assert_eq!(img.size(), (100, 50));

        let degenerate = image(0, 100, "a.png").with_width(50);
        assert_eq!(degenerate.size(), (50, 100));
    }

    #[test]
    fn test_opacity_is_clamped() {
        assert_eq!(empty().with_opacity(2.0).opacity(), 1.0);
        assert_eq!(empty().with_opacity(-1.0).opacity(), 0.0);
        assert_eq!(empty().with_opacity(f32::NAN).opacity(), 1.0);
    }

    #[test]
    fn test_document_order() {
        let order: Vec<_> = Direction::Up.document_order(3).collect();
        assert_eq!(order, vec![2, 1, 0]);
        let order: Vec<_> = Direction::Outward.document_order(3).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_text_uses_shaped_size() {
        let e = text(&MonospaceShaper::default(), "abcd", &TextStyle::new(10.0));
        assert_eq!(e.size(), (20, 13));
    }
}
