//! Embedding arbitrary renderables in a layout tree

use std::any::Any;
use std::fmt::Debug;

use tapestry_core::{Host, NodeId};

/// A value that knows how to render and update its own retained subtree.
///
/// The differ delegates to `update` only when the previous and next values
/// have the same concrete type (compared through [`as_any`](Self::as_any)).
pub trait Renderable: Debug {
    /// Render a fresh, detached subtree and return its root
    fn render(&self, host: &mut Host<'_>) -> NodeId;

    /// Bring `node`, last rendered from `previous`, up to date with `self`.
    ///
    /// Returns the node to use from now on. When it differs from `node` the
    /// caller puts it in place and drops `node`.
    fn update(&self, host: &mut Host<'_>, node: NodeId, previous: &dyn Renderable) -> NodeId;

    fn as_any(&self) -> &dyn Any;
}
