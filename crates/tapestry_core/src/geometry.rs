//! Geometry and color primitives shared by layout elements and collage forms
//!
//! All coordinates are `f32` device-independent pixels. Collage space uses a
//! centered origin with the y axis pointing up; layout and surface device space
//! use a top-left origin with the y axis pointing down. The conversion between
//! the two lives in [`Affine2D::collage_to_device`].

use std::f32::consts::TAU;

// ─────────────────────────────────────────────────────────────────────────────
// Core Geometry Types
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Point at distance `t` along the straight line toward `other`, given the
    /// precomputed total `length` of that line. Each axis is interpolated
    /// independently.
    pub fn toward(self, other: Point, t: f32, length: f32) -> Point {
        if length <= 0.0 {
            return self;
        }
        let f = t / length;
        Point::new(
            self.x + (other.x - self.x) * f,
            self.y + (other.y - self.y) * f,
        )
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are finite and non-negative
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }

    /// Scale both dimensions
    pub fn scaled(self, factor: f32) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transforms
// ─────────────────────────────────────────────────────────────────────────────

/// 2D affine transformation matrix
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine2D {
    /// Matrix elements [a, b, c, d, tx, ty]
    /// | a  c  tx |
    /// | b  d  ty |
    /// | 0  0   1 |
    pub elements: [f32; 6],
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    /// Build a matrix from row-major coefficients, so that
    /// `x' = a*x + b*y + dx` and `y' = c*x + d*y + dy`.
    pub fn matrix(a: f32, b: f32, c: f32, d: f32, dx: f32, dy: f32) -> Self {
        Self {
            elements: [a, c, b, d, dx, dy],
        }
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self {
            elements: [1.0, 0.0, 0.0, 1.0, x, y],
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            elements: [sx, 0.0, 0.0, sy, 0.0, 0.0],
        }
    }

    pub fn rotation(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            elements: [c, s, -s, c, 0.0, 0.0],
        }
    }

    /// Translate, then rotate by `theta` (reduced mod 2π), then scale uniformly.
    ///
    /// This is the local transform every collage form carries.
    pub fn local(x: f32, y: f32, theta: f32, scale: f32) -> Self {
        let mut m = Affine2D::translation(x, y);
        if theta != 0.0 {
            m = m.then(&Affine2D::rotation(theta % TAU));
        }
        if scale != 1.0 {
            m = m.then(&Affine2D::scale(scale, scale));
        }
        m
    }

    /// Global flip from collage space (centered origin, y up) to device space
    /// (top-left origin, y down) for a `width` x `height` viewport, scaled by
    /// `ratio` device pixels per unit.
    pub fn collage_to_device(width: f32, height: f32, ratio: f32) -> Self {
        Affine2D::translation(width / 2.0 * ratio, height / 2.0 * ratio)
            .then(&Affine2D::scale(ratio, -ratio))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn transform_point(&self, point: Point) -> Point {
        let [a, b, c, d, tx, ty] = self.elements;
        Point::new(
            a * point.x + c * point.y + tx,
            b * point.x + d * point.y + ty,
        )
    }

    /// Concatenate this transform with another (self * other)
    /// The resulting transform first applies `other`, then `self`.
    pub fn then(&self, other: &Affine2D) -> Affine2D {
        let [a1, b1, c1, d1, tx1, ty1] = self.elements;
        let [a2, b2, c2, d2, tx2, ty2] = other.elements;

        Affine2D {
            elements: [
                a1 * a2 + c1 * b2,
                b1 * a2 + d1 * b2,
                a1 * c2 + c1 * d2,
                b1 * c2 + d1 * d2,
                a1 * tx2 + c1 * ty2 + tx1,
                b1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color, each channel in `0.0..=1.0`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_then_applies_right_operand_first() {
        let m = Affine2D::translation(10.0, 0.0).then(&Affine2D::scale(2.0, 2.0));
        assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    }

    #[test]
    fn test_matrix_row_major_constructor() {
        let m = Affine2D::matrix(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        // x' = 1*1 + 2*1 + 5, y' = 3*1 + 4*1 + 6
        assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(8.0, 13.0));
    }

    #[test]
    fn test_collage_to_device_flips_and_centers() {
        let m = Affine2D::collage_to_device(200.0, 100.0, 2.0);
        assert!(approx(m.transform_point(Point::ZERO), Point::new(200.0, 100.0)));
        assert!(approx(
            m.transform_point(Point::new(10.0, 10.0)),
            Point::new(220.0, 80.0)
        ));
    }

    #[test]
    fn test_local_transform_order() {
        let m = Affine2D::local(5.0, 0.0, std::f32::consts::FRAC_PI_2, 2.0);
        // scale to (2, 0), rotate to (0, 2), translate to (5, 2)
        assert!(approx(m.transform_point(Point::new(1.0, 0.0)), Point::new(5.0, 2.0)));
    }

    #[test]
    fn test_toward_interpolates_each_axis() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(6.0, 8.0);
        let length = a.distance(b);
        assert_eq!(length, 10.0);
        assert!(approx(a.toward(b, 5.0, length), Point::new(3.0, 4.0)));
        assert_eq!(a.toward(a, 1.0, 0.0), a);
    }
}
