//! Tapestry Core
//!
//! This crate provides the primitives shared by the Tapestry layout differ and
//! the collage renderer:
//!
//! - **Geometry**: points, sizes, affine transforms, and colors
//! - **Drawing Surface**: the canvas-like seam collage forms are painted through
//! - **Platform Tree**: the retained node tree both engines keep in sync
//! - **Collaborators**: measurement, text shaping, and image asset loading
//! - **Retained Tree**: an in-memory backend for hosts and tests
//!
//! # Example
//!
//! ```rust
//! use tapestry_core::{NodeKind, PlatformTree, RetainedTree, StyleProp, StyleValue};
//!
//! let mut tree = RetainedTree::new();
//! let root = tree.create_node(NodeKind::Block);
//! let child = tree.create_node(NodeKind::Image);
//! tree.append_child(root, child).unwrap();
//! tree.set_style(child, StyleProp::Width, StyleValue::Px(40.0)).unwrap();
//!
//! assert_eq!(tree.children(root), vec![child]);
//! assert_eq!(tree.style(child, StyleProp::Width), Some(StyleValue::Px(40.0)));
//! ```

pub mod assets;
pub mod config;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod host;
pub mod measure;
pub mod retained;
pub mod tree;

pub use assets::{AssetCallback, AssetLoader, AssetState, ImageInfo, StaticAssets};
pub use config::EngineConfig;
pub use draw::{
    DrawingSurface, Gradient, GradientStop, LineCap, LineJoin, Paint, RecordingSurface,
    SurfaceCommand,
};
pub use error::{Result, TapestryError};
pub use geometry::{Affine2D, Color, Point, Rect, Size};
pub use host::{Host, MemoryBackend};
pub use measure::{Measure, MonospaceShaper, ShapedText, StyleMeasure, TextShaper, TextStyle};
pub use retained::{NodeSnapshot, RetainedTree, TreeStats};
pub use tree::{Attr, Keyword, Length, NodeId, NodeKind, PlatformTree, StyleProp, StyleValue};
