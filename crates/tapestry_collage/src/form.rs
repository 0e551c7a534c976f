//! Collage forms
//!
//! A [`Form`] is one immutable node of a collage scene: a basic drawable plus
//! a local transform (offset, rotation, uniform scale) and an alpha. Forms are
//! built with the free constructors in this module and adjusted with the
//! transform methods, which all return a new form.
//!
//! Collage coordinates put the origin at the center with the y axis up.
//!
//! # Example
//!
//! ```rust
//! use tapestry_collage::form::*;
//! use tapestry_core::Color;
//!
//! let dot = filled(Color::RED, circle(4.0)).move_by(10.0, 0.0);
//! let frame = outlined(dashed(Color::BLACK), rect(40.0, 20.0));
//! let scene = group(vec![dot, frame]).rotate(0.5).with_alpha(0.8);
//!
//! assert_eq!(scene.alpha, 0.8);
//! ```

use std::f32::consts::TAU;

use tapestry_core::{Affine2D, Color, Gradient, Point, TextStyle};
use tapestry_layout::LayoutElement;

// ─────────────────────────────────────────────────────────────────────────────
// Line Styles
// ─────────────────────────────────────────────────────────────────────────────

/// Shape at the end of a stroked line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cap {
    /// Ends exactly at the endpoint
    #[default]
    Flat,
    Round,
    /// Square extending half the line width past the endpoint
    Padded,
}

/// Shape where two stroked segments meet
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Join {
    Smooth,
    /// Mitered, falling back to a bevel past the limit
    Sharp(f32),
    Clipped,
}

impl Default for Join {
    fn default() -> Self {
        Join::Sharp(10.0)
    }
}

/// How a line is stroked
#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f32,
    pub cap: Cap,
    pub join: Join,
    /// Alternating on/off lengths, starting on. Empty is solid.
    pub dashing: Vec<f32>,
    pub dash_offset: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        default_line()
    }
}

impl LineStyle {
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_cap(mut self, cap: Cap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: Join) -> Self {
        self.join = join;
        self
    }

    pub fn with_dashing(mut self, dashing: Vec<f32>) -> Self {
        self.dashing = dashing;
        self
    }

    pub fn with_dash_offset(mut self, offset: f32) -> Self {
        self.dash_offset = offset;
        self
    }
}

/// Black, one pixel wide, flat caps, sharp joins, solid
pub fn default_line() -> LineStyle {
    LineStyle {
        color: Color::BLACK,
        width: 1.0,
        cap: Cap::Flat,
        join: Join::Sharp(10.0),
        dashing: Vec::new(),
        dash_offset: 0.0,
    }
}

pub fn solid(color: Color) -> LineStyle {
    LineStyle {
        color,
        ..default_line()
    }
}

pub fn dashed(color: Color) -> LineStyle {
    solid(color).with_dashing(vec![8.0, 4.0])
}

pub fn dotted(color: Color) -> LineStyle {
    solid(color).with_dashing(vec![3.0, 3.0])
}

// ─────────────────────────────────────────────────────────────────────────────
// Fill Styles
// ─────────────────────────────────────────────────────────────────────────────

/// How a shape is filled
#[derive(Clone, Debug, PartialEq)]
pub enum FillStyle {
    Solid(Color),
    /// Repeating image, by asset source
    Texture(String),
    /// Gradient described in collage coordinates
    Gradient(Gradient),
}

/// Outline or fill of a closed shape
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeStyle {
    Line(LineStyle),
    Fill(FillStyle),
}

// ─────────────────────────────────────────────────────────────────────────────
// Paths and Shapes
// ─────────────────────────────────────────────────────────────────────────────

/// An open polyline
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path(pub Vec<Point>);

/// A closed polygon
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape(pub Vec<Point>);

pub fn path(points: impl IntoIterator<Item = (f32, f32)>) -> Path {
    Path(points.into_iter().map(Point::from).collect())
}

pub fn segment(from: (f32, f32), to: (f32, f32)) -> Path {
    path([from, to])
}

pub fn polygon(points: impl IntoIterator<Item = (f32, f32)>) -> Shape {
    Shape(points.into_iter().map(Point::from).collect())
}

/// A `width` x `height` rectangle centered on the origin
pub fn rect(width: f32, height: f32) -> Shape {
    let hw = width / 2.0;
    let hh = height / 2.0;
    polygon([(-hw, -hh), (-hw, hh), (hw, hh), (hw, -hh)])
}

pub fn square(size: f32) -> Shape {
    rect(size, size)
}

/// An ellipse approximated by 50 points
pub fn oval(width: f32, height: f32) -> Shape {
    const SEGMENTS: usize = 50;
    let step = TAU / SEGMENTS as f32;
    let hw = width / 2.0;
    let hh = height / 2.0;
    polygon((0..SEGMENTS).map(|i| {
        let t = step * i as f32;
        (hw * t.cos(), hh * t.sin())
    }))
}

pub fn circle(radius: f32) -> Shape {
    oval(2.0 * radius, 2.0 * radius)
}

/// A regular polygon with `sides` corners on a circle of `radius`
pub fn ngon(sides: usize, radius: f32) -> Shape {
    if sides == 0 {
        return Shape::default();
    }
    let step = TAU / sides as f32;
    polygon((0..sides).map(|i| {
        let t = step * i as f32;
        (radius * t.cos(), radius * t.sin())
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Forms
// ─────────────────────────────────────────────────────────────────────────────

/// Text drawn into a collage, centered on the form origin
#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub content: String,
    pub style: TextStyle,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: TextStyle::default(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}

/// What a form draws
#[derive(Clone, Debug)]
pub enum BasicForm {
    Path {
        line: LineStyle,
        points: Vec<Point>,
    },
    Shape {
        style: ShapeStyle,
        points: Vec<Point>,
    },
    OutlinedText {
        line: LineStyle,
        text: Text,
    },
    Text(Text),
    /// `width` x `height` window of an image asset, `crop` is its top-left
    Image {
        width: f32,
        height: f32,
        crop: (f32, f32),
        src: String,
    },
    /// A layout element placed in the collage
    Element(LayoutElement),
    Group {
        matrix: Affine2D,
        children: Vec<Form>,
    },
}

/// A positioned, rotated, scaled and faded basic form
#[derive(Clone, Debug)]
pub struct Form {
    pub theta: f32,
    pub scale: f32,
    pub x: f32,
    pub y: f32,
    pub alpha: f32,
    pub basic: BasicForm,
}

impl Form {
    pub fn new(basic: BasicForm) -> Self {
        Self {
            theta: 0.0,
            scale: 1.0,
            x: 0.0,
            y: 0.0,
            alpha: 1.0,
            basic,
        }
    }

    /// Move by an offset
    pub fn move_by(mut self, x: f32, y: f32) -> Self {
        self.x += x;
        self.y += y;
        self
    }

    pub fn move_x(self, x: f32) -> Self {
        self.move_by(x, 0.0)
    }

    pub fn move_y(self, y: f32) -> Self {
        self.move_by(0.0, y)
    }

    /// Rotate counterclockwise by `theta` radians
    pub fn rotate(mut self, theta: f32) -> Self {
        self.theta += theta;
        self
    }

    pub fn scale(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Local transform: translate, then rotate, then scale
    pub fn local_transform(&self) -> Affine2D {
        Affine2D::local(self.x, self.y, self.theta, self.scale)
    }
}

pub fn traced(line: LineStyle, path: Path) -> Form {
    Form::new(BasicForm::Path {
        line,
        points: path.0,
    })
}

pub fn outlined(line: LineStyle, shape: Shape) -> Form {
    Form::new(BasicForm::Shape {
        style: ShapeStyle::Line(line),
        points: shape.0,
    })
}

pub fn filled(color: Color, shape: Shape) -> Form {
    fill(FillStyle::Solid(color), shape)
}

pub fn textured(src: impl Into<String>, shape: Shape) -> Form {
    fill(FillStyle::Texture(src.into()), shape)
}

pub fn gradient(gradient: Gradient, shape: Shape) -> Form {
    fill(FillStyle::Gradient(gradient), shape)
}

fn fill(style: FillStyle, shape: Shape) -> Form {
    Form::new(BasicForm::Shape {
        style: ShapeStyle::Fill(style),
        points: shape.0,
    })
}

pub fn text(text: Text) -> Form {
    Form::new(BasicForm::Text(text))
}

pub fn outlined_text(line: LineStyle, text: Text) -> Form {
    Form::new(BasicForm::OutlinedText { line, text })
}

/// A `width` x `height` piece of an image, cut at `crop`
pub fn sprite(width: f32, height: f32, crop: (f32, f32), src: impl Into<String>) -> Form {
    Form::new(BasicForm::Image {
        width,
        height,
        crop,
        src: src.into(),
    })
}

pub fn to_form(element: LayoutElement) -> Form {
    Form::new(BasicForm::Element(element))
}

pub fn group(children: Vec<Form>) -> Form {
    group_transform(Affine2D::IDENTITY, children)
}

/// Group whose children are additionally transformed by `matrix`
pub fn group_transform(matrix: Affine2D, children: Vec<Form>) -> Form {
    Form::new(BasicForm::Group { matrix, children })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_presets() {
        let line = default_line();
        assert_eq!(line.width, 1.0);
        assert_eq!(line.cap, Cap::Flat);
        assert_eq!(line.join, Join::Sharp(10.0));
        assert!(line.dashing.is_empty());
        assert_eq!(dashed(Color::RED).dashing, vec![8.0, 4.0]);
        assert_eq!(dotted(Color::RED).dashing, vec![3.0, 3.0]);
        assert_eq!(solid(Color::RED).color, Color::RED);
    }

    #[test]
    fn test_rect_corners() {
        let Shape(points) = rect(4.0, 2.0);
        assert_eq!(
            points,
            vec![
                Point::new(-2.0, -1.0),
                Point::new(-2.0, 1.0),
                Point::new(2.0, 1.0),
                Point::new(2.0, -1.0)
            ]
        );
    }

    #[test]
    fn test_round_shapes_point_counts() {
        assert_eq!(oval(10.0, 4.0).0.len(), 50);
        assert_eq!(circle(3.0).0[0], Point::new(3.0, 0.0));
        assert_eq!(ngon(6, 1.0).0.len(), 6);
        assert!(ngon(0, 1.0).0.is_empty());
    }

    #[test]
    fn test_transforms_accumulate() {
        let f = filled(Color::RED, square(2.0))
            .move_by(1.0, 2.0)
            .move_x(1.0)
            .rotate(0.25)
            .rotate(0.25)
            .scale(2.0)
            .scale(3.0);
        assert_eq!((f.x, f.y), (2.0, 2.0));
        assert_eq!(f.theta, 0.5);
        assert_eq!(f.scale, 6.0);
        assert_eq!(f.alpha, 1.0);
    }
}
