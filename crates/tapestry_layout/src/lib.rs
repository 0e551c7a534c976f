//! Tapestry Layout
//!
//! Immutable, sized layout elements and the differ that keeps a retained
//! platform tree in sync with them.
//!
//! # Example
//!
//! ```rust
//! use tapestry_core::{MemoryBackend, PlatformTree};
//! use tapestry_layout::prelude::*;
//!
//! let mut backend = MemoryBackend::new();
//!
//! let page = above(
//!     markup(200, 40, "<h1>Title</h1>"),
//!     container(200, 100, middle(), image(50, 50, "logo.png")),
//! );
//! assert_eq!(page.size(), (200, 140));
//!
//! let node = render(&mut backend.host(), &page);
//! assert_eq!(backend.tree.children(node).len(), 2);
//! ```

pub mod diff;
pub mod element;
pub mod position;
pub mod render;
pub mod renderable;

pub use diff::update;
pub use element::{Content, Direction, ImageStyle, LayoutElement, TextAlign};
pub use position::{Align, Placement, Pos, Position};
pub use render::render;
pub use renderable::Renderable;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::diff::update;
    pub use crate::element::{
        above, aligned_text, beside, below, container, cropped_image, embedded, empty,
        fitted_image, flow, image, layers, markup, spacer, text, tiled_image, Content, Direction,
        ImageStyle, LayoutElement, TextAlign,
    };
    pub use crate::position::{
        absolute, bottom_left, bottom_left_at, bottom_right, bottom_right_at, middle, middle_at,
        mid_bottom, mid_left, mid_right, mid_top, relative, top_left, top_left_at, top_right,
        top_right_at, Align, Pos, Position,
    };
    pub use crate::render::render;
    pub use crate::renderable::Renderable;
}
