//! Tapestry Collage
//!
//! Free-form 2D scenes embedded in layouts. A collage is a fixed-size area
//! holding a tree of [`Form`]s: traced paths, filled or outlined shapes, text,
//! image sprites, nested layout elements, and groups that carry a transform
//! and an alpha down to their children.
//!
//! Collages are layout elements, so the layout differ updates them like any
//! other element. Updates reuse the drawing surfaces and element wrappers
//! already in the retained tree where the form structure allows it.
//!
//! # Example
//!
//! ```rust
//! use tapestry_collage::prelude::*;
//! use tapestry_core::{Color, MemoryBackend, PlatformTree};
//!
//! let mut backend = MemoryBackend::new();
//!
//! let scene = collage(
//!     120,
//!     80,
//!     vec![
//!         filled(Color::BLUE, circle(20.0)),
//!         to_form(markup(40, 16, "label")).move_y(-25.0),
//!         traced(dashed(Color::RED), segment((-50.0, 0.0), (50.0, 0.0))),
//!     ],
//! );
//!
//! let node = render(&mut backend.host(), &scene);
//! // surface, wrapper, surface
//! assert_eq!(backend.tree.children(node).len(), 3);
//! ```

pub mod collage;
pub mod dash;
pub mod form;
mod renderer;

pub use collage::{collage, Collage};
pub use dash::{trace, TraceSegment};
pub use form::{BasicForm, Cap, FillStyle, Form, Join, LineStyle, ShapeStyle, Text};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collage::{collage, Collage};
    pub use crate::form::{
        circle, dashed, default_line, dotted, filled, gradient, group, group_transform, ngon,
        outlined, outlined_text, oval, path, polygon, rect, segment, solid, sprite, square, text,
        textured, to_form, traced, BasicForm, Cap, FillStyle, Form, Join, LineStyle, Path, Shape,
        ShapeStyle, Text,
    };
    pub use tapestry_layout::prelude::{markup, render, spacer, update, LayoutElement};
}
