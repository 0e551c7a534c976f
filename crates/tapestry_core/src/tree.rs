//! Platform tree seam
//!
//! The retained platform tree is the mutable, platform-side structure that the
//! layout differ and the collage renderer keep in sync with the latest values.
//! Both talk to it exclusively through [`PlatformTree`]; the in-memory
//! [`RetainedTree`](crate::retained::RetainedTree) is the reference backend.
//!
//! Styles and attributes are typed. Percent lengths are handed to the backend
//! unresolved: turning a fraction of the container into pixels is the
//! backend's job.

use slotmap::{new_key_type, Key};

use crate::draw::DrawingSurface;
use crate::error::Result;
use crate::geometry::{Affine2D, Color};

new_key_type! {
    pub struct NodeId;
}

impl NodeId {
    /// Convert to a raw u64 representation
    ///
    /// This is useful for storing node IDs in type-erased contexts.
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Create from a raw u64 representation created by `to_raw()`
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Kind of a retained node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// Generic block box
    Block,
    /// Replaced image node
    Image,
    /// Hyperlink wrapper around a rendered element
    Link,
    /// 2D drawing surface
    Surface,
    /// Positions an embedded layout element inside a collage
    Wrapper,
}

/// Style property keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProp {
    Width,
    Height,
    Opacity,
    BackgroundColor,
    BackgroundImage,
    BackgroundSize,
    BackgroundPosition,
    BackgroundRepeat,
    Display,
    Position,
    Overflow,
    Float,
    PointerEvents,
    Left,
    Right,
    Top,
    Bottom,
    Margin,
    MarginLeft,
    MarginTop,
    /// Applied about the node's center
    Transform,
    TextAlign,
}

/// Keyword style values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    Auto,
    None,
    Block,
    Absolute,
    Relative,
    Hidden,
    Left,
    Right,
    Center,
    Justify,
    Cover,
    Repeat,
    NoRepeat,
}

/// A length handed to the platform
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// Device-independent pixels
    Px(f32),
    /// Percentage of the containing box's matching dimension
    Percent(f32),
}

/// Typed style values
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    Px(f32),
    Percent(f32),
    Number(f32),
    Color(Color),
    Url(String),
    Transform(Affine2D),
    Keyword(Keyword),
}

impl StyleValue {
    /// Pixel value, if this is a pixel length
    pub fn as_px(&self) -> Option<f32> {
        match self {
            StyleValue::Px(px) => Some(*px),
            _ => None,
        }
    }
}

impl From<Length> for StyleValue {
    fn from(length: Length) -> Self {
        match length {
            Length::Px(px) => StyleValue::Px(px),
            Length::Percent(pct) => StyleValue::Percent(pct),
        }
    }
}

impl From<Keyword> for StyleValue {
    fn from(keyword: Keyword) -> Self {
        StyleValue::Keyword(keyword)
    }
}

/// Attribute keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attr {
    /// Element identifier (the anchor tag)
    Id,
    Href,
    Src,
    Name,
}

/// Operations the engine needs from the platform's retained node tree.
///
/// Removal (`remove_child`, `replace_child`, `release`) drops the removed node
/// and its whole subtree; callers move nodes they want to keep *before*
/// removing their former parent. `append_child` and `insert_before` move a
/// node that is already attached elsewhere.
pub trait PlatformTree {
    /// Create a detached node
    fn create_node(&mut self, kind: NodeKind) -> NodeId;

    /// Kind of a live node, `None` if the node does not exist
    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn first_child(&self, node: NodeId) -> Option<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Insert `child` before `reference`, or append when `reference` is `None`
    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()>;

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Put `new_child` where `old_child` is and drop `old_child`
    fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId)
        -> Result<()>;

    /// Take a node out of its parent without dropping it
    fn detach(&mut self, node: NodeId);

    /// Drop a node and its subtree, detaching it first
    fn release(&mut self, node: NodeId);

    fn style(&self, node: NodeId, prop: StyleProp) -> Option<StyleValue>;
    fn set_style(&mut self, node: NodeId, prop: StyleProp, value: StyleValue) -> Result<()>;
    fn remove_style(&mut self, node: NodeId, prop: StyleProp) -> Result<()>;

    fn attribute(&self, node: NodeId, attr: Attr) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, attr: Attr, value: &str) -> Result<()>;
    fn remove_attribute(&mut self, node: NodeId, attr: Attr) -> Result<()>;

    /// Replace the node's content with parsed markup
    fn set_markup(&mut self, node: NodeId, markup: &str) -> Result<()>;
    fn markup(&self, node: NodeId) -> Option<String>;

    /// Drawing surface of a `NodeKind::Surface` node
    fn surface_mut(&mut self, node: NodeId) -> Option<&mut dyn DrawingSurface>;

    /// Children in document order
    fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut next = self.first_child(parent);
        while let Some(child) = next {
            out.push(child);
            next = self.next_sibling(child);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_node_id_raw_roundtrip() {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        let id = map.insert(());
        assert_eq!(NodeId::from_raw(id.to_raw()), id);
    }

    #[test]
    fn test_length_into_style_value() {
        assert_eq!(StyleValue::from(Length::Px(3.0)), StyleValue::Px(3.0));
        assert_eq!(
            StyleValue::from(Length::Percent(50.0)),
            StyleValue::Percent(50.0)
        );
        assert_eq!(StyleValue::Px(4.0).as_px(), Some(4.0));
        assert_eq!(StyleValue::Number(4.0).as_px(), None);
    }
}
