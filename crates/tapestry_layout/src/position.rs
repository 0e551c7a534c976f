//! Anchor positions for container children
//!
//! A [`Position`] pins a child box to one edge per axis, or centers it. The
//! resolver turns it into a [`Placement`]: which edge style to set, which to
//! clear, and the compensating translate for centered axes. Relative offsets
//! stay percentages; resolving them against the container is the platform's
//! job.

use tapestry_core::{Affine2D, Keyword, Length, NodeId, PlatformTree, Result, StyleProp, StyleValue};

/// Alignment along one axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    /// Left edge horizontally, top edge vertically
    #[default]
    Near,
    Center,
    /// Right edge horizontally, bottom edge vertically
    Far,
}

/// Offset from the pinned edge
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pos {
    /// Pixels
    Absolute(i32),
    /// Fraction of the container's matching dimension
    Relative(f32),
}

impl Default for Pos {
    fn default() -> Self {
        Pos::Absolute(0)
    }
}

impl Pos {
    pub fn to_length(self) -> Length {
        match self {
            Pos::Absolute(px) => Length::Px(px as f32),
            Pos::Relative(fraction) => Length::Percent(fraction * 100.0),
        }
    }
}

/// Where a child sits inside a container
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub horizontal: Align,
    pub vertical: Align,
    pub x: Pos,
    pub y: Pos,
}

impl Position {
    pub const fn new(horizontal: Align, vertical: Align, x: Pos, y: Pos) -> Self {
        Self {
            horizontal,
            vertical,
            x,
            y,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn absolute(px: i32) -> Pos {
    Pos::Absolute(px)
}

pub fn relative(fraction: f32) -> Pos {
    Pos::Relative(fraction)
}

const HALF: Pos = Pos::Relative(0.5);
const ZERO: Pos = Pos::Absolute(0);

pub fn middle() -> Position {
    Position::new(Align::Center, Align::Center, HALF, HALF)
}

pub fn top_left() -> Position {
    Position::new(Align::Near, Align::Near, ZERO, ZERO)
}

pub fn top_right() -> Position {
    Position::new(Align::Far, Align::Near, ZERO, ZERO)
}

pub fn bottom_left() -> Position {
    Position::new(Align::Near, Align::Far, ZERO, ZERO)
}

pub fn bottom_right() -> Position {
    Position::new(Align::Far, Align::Far, ZERO, ZERO)
}

pub fn mid_left() -> Position {
    Position::new(Align::Near, Align::Center, ZERO, HALF)
}

pub fn mid_right() -> Position {
    Position::new(Align::Far, Align::Center, ZERO, HALF)
}

pub fn mid_top() -> Position {
    Position::new(Align::Center, Align::Near, HALF, ZERO)
}

pub fn mid_bottom() -> Position {
    Position::new(Align::Center, Align::Far, HALF, ZERO)
}

/// Centered at the given offsets from the top-left corner
pub fn middle_at(x: Pos, y: Pos) -> Position {
    Position::new(Align::Center, Align::Center, x, y)
}

pub fn top_left_at(x: Pos, y: Pos) -> Position {
    Position::new(Align::Near, Align::Near, x, y)
}

pub fn top_right_at(x: Pos, y: Pos) -> Position {
    Position::new(Align::Far, Align::Near, x, y)
}

pub fn bottom_left_at(x: Pos, y: Pos) -> Position {
    Position::new(Align::Near, Align::Far, x, y)
}

pub fn bottom_right_at(x: Pos, y: Pos) -> Position {
    Position::new(Align::Far, Align::Far, x, y)
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// One axis of a resolved placement
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgePin {
    /// Edge style to set
    pub edge: StyleProp,
    /// Edge style to clear
    pub opposite: StyleProp,
    pub offset: Length,
}

/// Resolved placement of a box inside its container
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub horizontal: EdgePin,
    pub vertical: EdgePin,
    /// Translate applied on centered axes, whole pixels
    pub shift_x: f32,
    pub shift_y: f32,
}

impl Placement {
    pub fn transform(&self) -> Affine2D {
        Affine2D::translation(self.shift_x, self.shift_y)
    }
}

/// Resolve `position` for a box of `width` x `height` pixels
pub fn resolve(position: &Position, width: u32, height: u32) -> Placement {
    let (horizontal, shift_x) = resolve_axis(
        position.horizontal,
        position.x,
        width,
        StyleProp::Left,
        StyleProp::Right,
    );
    let (vertical, shift_y) = resolve_axis(
        position.vertical,
        position.y,
        height,
        StyleProp::Top,
        StyleProp::Bottom,
    );
    Placement {
        horizontal,
        vertical,
        shift_x,
        shift_y,
    }
}

fn resolve_axis(
    align: Align,
    pos: Pos,
    extent: u32,
    near: StyleProp,
    far: StyleProp,
) -> (EdgePin, f32) {
    let offset = pos.to_length();
    match align {
        Align::Near => (
            EdgePin {
                edge: near,
                opposite: far,
                offset,
            },
            0.0,
        ),
        Align::Center => (
            EdgePin {
                edge: near,
                opposite: far,
                offset,
            },
            -((extent / 2) as f32),
        ),
        Align::Far => (
            EdgePin {
                edge: far,
                opposite: near,
                offset,
            },
            0.0,
        ),
    }
}

/// Apply a placement to a retained node.
///
/// Identity translates remove the transform style so a reused node matches a
/// freshly placed one.
pub fn apply_placement(tree: &mut dyn PlatformTree, node: NodeId, placement: &Placement) -> Result<()> {
    tree.set_style(node, StyleProp::Position, Keyword::Absolute.into())?;
    tree.set_style(node, StyleProp::Margin, Keyword::Auto.into())?;
    for pin in [placement.horizontal, placement.vertical] {
        tree.set_style(node, pin.edge, pin.offset.into())?;
        tree.remove_style(node, pin.opposite)?;
    }

    let transform = placement.transform();
    if transform.is_identity() {
        tree.remove_style(node, StyleProp::Transform)
    } else {
        tree.set_style(node, StyleProp::Transform, StyleValue::Transform(transform))
    }
}
