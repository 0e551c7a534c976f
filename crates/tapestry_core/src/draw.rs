//! Drawing Surface - canvas-like 2D raster target
//!
//! The `DrawingSurface` trait is the seam between the collage renderer and a
//! platform's 2D canvas. It mirrors the HTML canvas state machine: a current
//! transform and global alpha that are saved and restored as a stack, a current
//! path built with move/line operations, and fill/stroke operations that consume
//! the path with the current styles.
//!
//! `RecordingSurface` implements the trait by recording every call as a
//! [`SurfaceCommand`] together with the effective state at draw time, which is
//! what the in-memory backend and the tests use.
//!
//! # Example
//!
//! ```rust
//! use tapestry_core::draw::{DrawingSurface, RecordingSurface, SurfaceCommand};
//! use tapestry_core::{Point, Size};
//!
//! let mut surface = RecordingSurface::new(Size::new(100.0, 100.0));
//! surface.save();
//! surface.set_global_alpha(0.5);
//! surface.begin_path();
//! surface.move_to(Point::new(0.0, 0.0));
//! surface.line_to(Point::new(10.0, 0.0));
//! surface.stroke();
//! surface.restore();
//!
//! assert!(surface
//!     .commands()
//!     .iter()
//!     .any(|c| matches!(c, SurfaceCommand::Stroke { alpha, .. } if *alpha == 0.5)));
//! ```

use crate::geometry::{Affine2D, Color, Point, Rect, Size};

// ─────────────────────────────────────────────────────────────────────────────
// Stroke Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Line cap style as understood by the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    /// Flat cap at the endpoint
    #[default]
    Butt,
    /// Rounded cap extending past the endpoint
    Round,
    /// Square cap extending past the endpoint
    Square,
}

/// Line join style as understood by the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineJoin {
    /// Miter join (sharp corner)
    #[default]
    Miter,
    /// Round join
    Round,
    /// Bevel join (flat corner)
    Bevel,
}

// ─────────────────────────────────────────────────────────────────────────────
// Paint
// ─────────────────────────────────────────────────────────────────────────────

/// A color stop in a gradient
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0)
    pub offset: f32,
    /// Color at this stop
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// Gradient fill description
#[derive(Clone, Debug, PartialEq)]
pub enum Gradient {
    /// Linear gradient between two points
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
    /// Radial gradient between two circles
    Radial {
        inner_center: Point,
        inner_radius: f32,
        outer_center: Point,
        outer_radius: f32,
        stops: Vec<GradientStop>,
    },
}

impl Gradient {
    /// Mirror the gradient's geometry across the x axis.
    ///
    /// Collage gradients are described with y up; the renderer flips the
    /// surface before filling, so the geometry is flipped to match.
    pub fn flipped_y(&self) -> Gradient {
        let flip = |p: &Point| Point::new(p.x, -p.y);
        match self {
            Gradient::Linear { start, end, stops } => Gradient::Linear {
                start: flip(start),
                end: flip(end),
                stops: stops.clone(),
            },
            Gradient::Radial {
                inner_center,
                inner_radius,
                outer_center,
                outer_radius,
                stops,
            } => Gradient::Radial {
                inner_center: flip(inner_center),
                inner_radius: *inner_radius,
                outer_center: flip(outer_center),
                outer_radius: *outer_radius,
                stops: stops.clone(),
            },
        }
    }
}

/// Stroke or fill style
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Repeating image pattern keyed by asset source
    Pattern(String),
    Gradient(Gradient),
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Drawing Surface
// ─────────────────────────────────────────────────────────────────────────────

/// A reusable canvas-like 2D raster target.
///
/// Transform calls post-multiply the current transform, like the HTML canvas.
pub trait DrawingSurface {
    /// Clear all content and state and resize the backing store to `size`
    /// device pixels. The transform becomes identity and alpha 1.
    fn reset(&mut self, size: Size);

    // State stack

    fn save(&mut self);
    fn restore(&mut self);
    fn set_transform(&mut self, transform: Affine2D);
    fn transform(&mut self, transform: Affine2D);

    fn translate(&mut self, x: f32, y: f32) {
        self.transform(Affine2D::translation(x, y));
    }

    fn rotate(&mut self, angle: f32) {
        self.transform(Affine2D::rotation(angle));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.transform(Affine2D::scale(sx, sy));
    }

    fn set_global_alpha(&mut self, alpha: f32);

    // Styles

    fn set_stroke_style(&mut self, paint: Paint);
    fn set_fill_style(&mut self, paint: Paint);
    fn set_line_width(&mut self, width: f32);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    fn set_miter_limit(&mut self, limit: f32);

    /// Whether `set_line_dash` is honored natively
    fn supports_line_dash(&self) -> bool {
        false
    }

    fn set_line_dash(&mut self, _pattern: &[f32], _offset: f32) {}

    // Paths

    fn begin_path(&mut self);
    fn move_to(&mut self, point: Point);
    fn line_to(&mut self, point: Point);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);

    // Images and text

    /// Draw the `source` rectangle of the image asset `src` into `dest`
    fn draw_image(&mut self, src: &str, source: Rect, dest: Rect);
    fn set_font(&mut self, font: &str);
    fn measure_text(&mut self, text: &str) -> f32;
    fn fill_text(&mut self, text: &str, origin: Point);
    fn stroke_text(&mut self, text: &str, origin: Point);
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording Surface
// ─────────────────────────────────────────────────────────────────────────────

/// A surface call as recorded by [`RecordingSurface`].
///
/// Draw operations carry the effective transform and alpha at the time they
/// were issued.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCommand {
    Save,
    Restore,
    SetTransform(Affine2D),
    Transform(Affine2D),
    GlobalAlpha(f32),
    StrokeStyle(Paint),
    FillStyle(Paint),
    LineWidth(f32),
    LineCap(LineCap),
    LineJoin(LineJoin),
    MiterLimit(f32),
    LineDash { pattern: Vec<f32>, offset: f32 },
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    ClosePath,
    Fill { transform: Affine2D, alpha: f32 },
    Stroke { transform: Affine2D, alpha: f32 },
    DrawImage {
        src: String,
        source: Rect,
        dest: Rect,
        transform: Affine2D,
        alpha: f32,
    },
    Font(String),
    FillText {
        text: String,
        origin: Point,
        transform: Affine2D,
        alpha: f32,
    },
    StrokeText {
        text: String,
        origin: Point,
        transform: Affine2D,
        alpha: f32,
    },
}

impl SurfaceCommand {
    /// True for commands that put pixels on the surface
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            SurfaceCommand::Fill { .. }
                | SurfaceCommand::Stroke { .. }
                | SurfaceCommand::DrawImage { .. }
                | SurfaceCommand::FillText { .. }
                | SurfaceCommand::StrokeText { .. }
        )
    }

    /// Effective alpha of a draw command
    pub fn draw_alpha(&self) -> Option<f32> {
        match self {
            SurfaceCommand::Fill { alpha, .. }
            | SurfaceCommand::Stroke { alpha, .. }
            | SurfaceCommand::DrawImage { alpha, .. }
            | SurfaceCommand::FillText { alpha, .. }
            | SurfaceCommand::StrokeText { alpha, .. } => Some(*alpha),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SurfaceState {
    transform: Affine2D,
    alpha: f32,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            transform: Affine2D::IDENTITY,
            alpha: 1.0,
        }
    }
}

/// A surface that records commands for inspection
#[derive(Debug)]
pub struct RecordingSurface {
    size: Size,
    commands: Vec<SurfaceCommand>,
    state: SurfaceState,
    saved: Vec<SurfaceState>,
    native_dash: bool,
    /// Average glyph advance, as a fraction of the font size
    glyph_advance: f32,
    font_size: f32,
}

impl RecordingSurface {
    /// Create a new recording surface
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
            state: SurfaceState::default(),
            saved: Vec::new(),
            native_dash: false,
            glyph_advance: 0.5,
            font_size: 10.0,
        }
    }

    /// Report native line dash support
    pub fn with_native_dash(mut self, supported: bool) -> Self {
        self.native_dash = supported;
        self
    }

    /// Get the recorded commands
    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Backing store size in device pixels
    pub fn size(&self) -> Size {
        self.size
    }

    /// Current save-stack depth
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Effective alpha of every draw command, in order
    pub fn draw_alphas(&self) -> Vec<f32> {
        self.commands.iter().filter_map(|c| c.draw_alpha()).collect()
    }

    fn parse_font_size(font: &str) -> Option<f32> {
        font.split_whitespace()
            .find_map(|part| part.strip_suffix("px"))
            .and_then(|px| px.parse::<f32>().ok())
    }
}

impl DrawingSurface for RecordingSurface {
    fn reset(&mut self, size: Size) {
        self.size = size;
        self.commands.clear();
        self.saved.clear();
        self.state = SurfaceState::default();
    }

    fn save(&mut self) {
        self.commands.push(SurfaceCommand::Save);
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        self.commands.push(SurfaceCommand::Restore);
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn set_transform(&mut self, transform: Affine2D) {
        self.commands.push(SurfaceCommand::SetTransform(transform));
        self.state.transform = transform;
    }

    fn transform(&mut self, transform: Affine2D) {
        self.commands.push(SurfaceCommand::Transform(transform));
        self.state.transform = self.state.transform.then(&transform);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(SurfaceCommand::GlobalAlpha(alpha));
        self.state.alpha = alpha;
    }

    fn set_stroke_style(&mut self, paint: Paint) {
        self.commands.push(SurfaceCommand::StrokeStyle(paint));
    }

    fn set_fill_style(&mut self, paint: Paint) {
        self.commands.push(SurfaceCommand::FillStyle(paint));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(SurfaceCommand::LineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.commands.push(SurfaceCommand::LineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.commands.push(SurfaceCommand::LineJoin(join));
    }

    fn set_miter_limit(&mut self, limit: f32) {
        self.commands.push(SurfaceCommand::MiterLimit(limit));
    }

    fn supports_line_dash(&self) -> bool {
        self.native_dash
    }

    fn set_line_dash(&mut self, pattern: &[f32], offset: f32) {
        self.commands.push(SurfaceCommand::LineDash {
            pattern: pattern.to_vec(),
            offset,
        });
    }

    fn begin_path(&mut self) {
        self.commands.push(SurfaceCommand::BeginPath);
    }

    fn move_to(&mut self, point: Point) {
        self.commands.push(SurfaceCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: Point) {
        self.commands.push(SurfaceCommand::LineTo(point));
    }

    fn close_path(&mut self) {
        self.commands.push(SurfaceCommand::ClosePath);
    }

    fn fill(&mut self) {
        self.commands.push(SurfaceCommand::Fill {
            transform: self.state.transform,
            alpha: self.state.alpha,
        });
    }

    fn stroke(&mut self) {
        self.commands.push(SurfaceCommand::Stroke {
            transform: self.state.transform,
            alpha: self.state.alpha,
        });
    }

    fn draw_image(&mut self, src: &str, source: Rect, dest: Rect) {
        self.commands.push(SurfaceCommand::DrawImage {
            src: src.to_string(),
            source,
            dest,
            transform: self.state.transform,
            alpha: self.state.alpha,
        });
    }

    fn set_font(&mut self, font: &str) {
        if let Some(size) = Self::parse_font_size(font) {
            self.font_size = size;
        }
        self.commands.push(SurfaceCommand::Font(font.to_string()));
    }

    fn measure_text(&mut self, text: &str) -> f32 {
        text.chars().count() as f32 * self.font_size * self.glyph_advance
    }

    fn fill_text(&mut self, text: &str, origin: Point) {
        self.commands.push(SurfaceCommand::FillText {
            text: text.to_string(),
            origin,
            transform: self.state.transform,
            alpha: self.state.alpha,
        });
    }

    fn stroke_text(&mut self, text: &str, origin: Point) {
        self.commands.push(SurfaceCommand::StrokeText {
            text: text.to_string(),
            origin,
            transform: self.state.transform,
            alpha: self.state.alpha,
        });
    }
}
