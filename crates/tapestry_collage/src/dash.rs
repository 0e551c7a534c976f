//! Dash pattern tracer
//!
//! Walks a polyline with a cyclic on/off pattern and splits it into draw and
//! skip segments. Used to stroke dashed lines on surfaces without native dash
//! support.

use tapestry_core::Point;

/// One piece of a traced polyline
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraceSegment {
    Draw { from: Point, to: Point },
    Skip { from: Point, to: Point },
}

impl TraceSegment {
    fn new(drawing: bool, from: Point, to: Point) -> Self {
        if drawing {
            TraceSegment::Draw { from, to }
        } else {
            TraceSegment::Skip { from, to }
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, TraceSegment::Draw { .. })
    }

    pub fn from(&self) -> Point {
        match self {
            TraceSegment::Draw { from, .. } | TraceSegment::Skip { from, .. } => *from,
        }
    }

    pub fn to(&self) -> Point {
        match self {
            TraceSegment::Draw { to, .. } | TraceSegment::Skip { to, .. } => *to,
        }
    }

    pub fn length(&self) -> f32 {
        self.from().distance(self.to())
    }
}

/// The pattern to trace with, or `None` for a solid line.
///
/// Patterns with a non-positive or non-finite entry are treated as solid.
pub fn sanitize(pattern: &[f32]) -> Option<&[f32]> {
    if pattern.is_empty() {
        return None;
    }
    if pattern.iter().any(|len| !len.is_finite() || *len <= 0.0) {
        tracing::warn!(?pattern, "Dash pattern has non-positive entries, drawing solid");
        return None;
    }
    Some(pattern)
}

/// Consecutive point pairs, closing back to the first point when `closed`
fn pairs(points: &[Point], closed: bool) -> impl Iterator<Item = (Point, Point)> + '_ {
    let closing = match (closed, points.first(), points.last()) {
        (true, Some(first), Some(last)) if points.len() > 1 => Some((*last, *first)),
        _ => None,
    };
    points
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .chain(closing)
}

/// Split the polyline through `points` into draw and skip segments.
///
/// The pattern starts "on" at the first point and carries over from one
/// segment of the polyline to the next. Zero-length segments produce nothing.
///
/// Progress along each segment is measured from its start point in `f64`, so
/// dashes far shorter than the segment still advance. A dash too short to move
/// the position at all ends the segment with its remainder in the current phase.
pub fn trace(points: &[Point], pattern: &[f32], closed: bool) -> Vec<TraceSegment> {
    let mut out = Vec::new();

    let Some(pattern) = sanitize(pattern) else {
        out.extend(
            pairs(points, closed)
                .filter(|(a, b)| a.distance(*b) > 0.0)
                .map(|(from, to)| TraceSegment::Draw { from, to }),
        );
        return out;
    };

    let mut index = 0;
    let mut remaining = f64::from(pattern[0]);
    let mut drawing = true;

    for (a, b) in pairs(points, closed) {
        let (dx, dy) = (f64::from(b.x) - f64::from(a.x), f64::from(b.y) - f64::from(a.y));
        let length = dx.hypot(dy);
        let mut from = a;
        let mut travelled = 0.0_f64;

        while travelled < length {
            let left = length - travelled;
            if left < remaining {
                out.push(TraceSegment::new(drawing, from, b));
                remaining -= left;
                break;
            }

            let next = travelled + remaining;
            if next <= travelled {
                tracing::debug!(remaining, length, "Dash too short to advance, finishing segment");
                out.push(TraceSegment::new(drawing, from, b));
                break;
            }

            let f = next / length;
            let to = Point::new(
                (f64::from(a.x) + dx * f) as f32,
                (f64::from(a.y) + dy * f) as f32,
            );
            out.push(TraceSegment::new(drawing, from, to));
            from = to;
            travelled = next;
            drawing = !drawing;
            index = (index + 1) % pattern.len();
            remaining = f64::from(pattern[index]);
        }
    }

    out
}
