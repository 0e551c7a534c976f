//! In-memory retained tree
//!
//! `RetainedTree` is the reference [`PlatformTree`] backend. Nodes live in a
//! slot map, surface nodes own a [`RecordingSurface`], and every structural
//! call is counted so callers can check how much of a tree a pass reused.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::draw::{DrawingSurface, RecordingSurface, SurfaceCommand};
use crate::error::{Result, TapestryError};
use crate::geometry::Size;
use crate::tree::{Attr, NodeId, NodeKind, PlatformTree, StyleProp, StyleValue};

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    styles: FxHashMap<StyleProp, StyleValue>,
    attributes: FxHashMap<Attr, String>,
    markup: Option<String>,
    surface: Option<RecordingSurface>,
}

/// Structural call counts
#[derive(Clone, Debug, Default)]
pub struct TreeStats {
    created: FxHashMap<NodeKind, usize>,
    /// Nodes dropped through `remove_child` / `replace_child`, in call order
    pub removed: Vec<NodeId>,
    /// Number of `replace_child` calls
    pub replaced: usize,
}

impl TreeStats {
    /// Number of nodes of `kind` created
    pub fn created(&self, kind: NodeKind) -> usize {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    /// Number of nodes created, any kind
    pub fn created_total(&self) -> usize {
        self.created.values().sum()
    }
}

/// Structural, order-independent view of a retained subtree.
///
/// Two subtrees with equal snapshots are observably identical.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
    pub kind: NodeKind,
    pub styles: BTreeMap<StyleProp, StyleValue>,
    pub attributes: BTreeMap<Attr, String>,
    pub markup: Option<String>,
    pub surface_size: Option<Size>,
    pub commands: Vec<SurfaceCommand>,
    pub children: Vec<NodeSnapshot>,
}

/// Slot-map backed retained tree
#[derive(Debug, Default)]
pub struct RetainedTree {
    nodes: SlotMap<NodeId, NodeData>,
    stats: TreeStats,
    native_dash: bool,
}

impl RetainedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make new surfaces report native line dash support
    pub fn with_native_dash(mut self, supported: bool) -> Self {
        self.native_dash = supported;
        self
    }

    /// Get the number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Forget all counts collected so far
    pub fn reset_stats(&mut self) {
        self.stats = TreeStats::default();
    }

    /// Recorded surface of a surface node
    pub fn surface(&self, node: NodeId) -> Option<&RecordingSurface> {
        self.nodes.get(node)?.surface.as_ref()
    }

    /// Snapshot a subtree
    pub fn snapshot(&self, node: NodeId) -> Option<NodeSnapshot> {
        let data = self.nodes.get(node)?;
        let children = data
            .children
            .iter()
            .filter_map(|&child| self.snapshot(child))
            .collect();
        Some(NodeSnapshot {
            kind: data.kind,
            styles: data.styles.iter().map(|(k, v)| (*k, v.clone())).collect(),
            attributes: data.attributes.iter().map(|(k, v)| (*k, v.clone())).collect(),
            markup: data.markup.clone(),
            surface_size: data.surface.as_ref().map(|s| s.size()),
            commands: data
                .surface
                .as_ref()
                .map(|s| s.commands().to_vec())
                .unwrap_or_default(),
            children,
        })
    }

    fn node(&self, node: NodeId) -> Result<&NodeData> {
        self.nodes.get(node).ok_or(TapestryError::MissingNode(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(node).ok_or(TapestryError::MissingNode(node))
    }

    /// True if `node` is `ancestor` or lies beneath it
    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_within(parent, child) {
            return Err(TapestryError::Cycle(child));
        }
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get(child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            parent_data.children.retain(|c| *c != child);
        }
        if let Some(child_data) = self.nodes.get_mut(child) {
            child_data.parent = None;
        }
    }

    fn drop_subtree(&mut self, node: NodeId) {
        if let Some(data) = self.nodes.remove(node) {
            for child in data.children {
                self.drop_subtree(child);
            }
        }
    }

    fn expect_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(TapestryError::NotAChild { parent, child });
        }
        Ok(())
    }
}

impl PlatformTree for RetainedTree {
    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        *self.stats.created.entry(kind).or_insert(0) += 1;
        let surface = (kind == NodeKind::Surface)
            .then(|| RecordingSurface::new(Size::ZERO).with_native_dash(self.native_dash));
        self.nodes.insert(NodeData {
            kind,
            parent: None,
            children: SmallVec::new(),
            styles: FxHashMap::default(),
            attributes: FxHashMap::default(),
            markup: None,
            surface,
        })
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node).map(|n| n.kind)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.children.first().copied()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(node)?.parent?;
        let siblings = &self.nodes.get(parent)?.children;
        let index = siblings.iter().position(|c| *c == node)?;
        siblings.get(index + 1).copied()
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if reference == Some(child) {
            return self.expect_child(parent, child);
        }
        self.check_attach(parent, child)?;
        if let Some(reference) = reference {
            self.expect_child(parent, reference)?;
        }

        self.unlink(child);
        let parent_data = self.node_mut(parent)?;
        let index = match reference {
            Some(reference) => parent_data
                .children
                .iter()
                .position(|c| *c == reference)
                .ok_or(TapestryError::NotAChild {
                    parent,
                    child: reference,
                })?,
            None => parent_data.children.len(),
        };
        parent_data.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.expect_child(parent, child)?;
        self.unlink(child);
        self.drop_subtree(child);
        self.stats.removed.push(child);
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<()> {
        if new_child == old_child {
            return self.expect_child(parent, old_child);
        }
        self.expect_child(parent, old_child)?;
        self.check_attach(parent, new_child)?;
        if self.is_within(new_child, old_child) {
            return Err(TapestryError::Cycle(new_child));
        }

        self.unlink(new_child);
        let parent_data = self.node_mut(parent)?;
        let index = parent_data
            .children
            .iter()
            .position(|c| *c == old_child)
            .ok_or(TapestryError::NotAChild {
                parent,
                child: old_child,
            })?;
        parent_data.children[index] = new_child;
        self.node_mut(new_child)?.parent = Some(parent);
        self.node_mut(old_child)?.parent = None;

        self.drop_subtree(old_child);
        self.stats.removed.push(old_child);
        self.stats.replaced += 1;
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        self.unlink(node);
    }

    fn release(&mut self, node: NodeId) {
        self.unlink(node);
        self.drop_subtree(node);
    }

    fn style(&self, node: NodeId, prop: StyleProp) -> Option<StyleValue> {
        self.nodes.get(node)?.styles.get(&prop).cloned()
    }

    fn set_style(&mut self, node: NodeId, prop: StyleProp, value: StyleValue) -> Result<()> {
        self.node_mut(node)?.styles.insert(prop, value);
        Ok(())
    }

    fn remove_style(&mut self, node: NodeId, prop: StyleProp) -> Result<()> {
        self.node_mut(node)?.styles.remove(&prop);
        Ok(())
    }

    fn attribute(&self, node: NodeId, attr: Attr) -> Option<String> {
        self.nodes.get(node)?.attributes.get(&attr).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, attr: Attr, value: &str) -> Result<()> {
        self.node_mut(node)?
            .attributes
            .insert(attr, value.to_string());
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, attr: Attr) -> Result<()> {
        self.node_mut(node)?.attributes.remove(&attr);
        Ok(())
    }

    fn set_markup(&mut self, node: NodeId, markup: &str) -> Result<()> {
        self.node_mut(node)?.markup = Some(markup.to_string());
        Ok(())
    }

    fn markup(&self, node: NodeId) -> Option<String> {
        self.nodes.get(node)?.markup.clone()
    }

    fn surface_mut(&mut self, node: NodeId) -> Option<&mut dyn DrawingSurface> {
        self.nodes
            .get_mut(node)?
            .surface
            .as_mut()
            .map(|s| s as &mut dyn DrawingSurface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_children(n: usize) -> (RetainedTree, NodeId, Vec<NodeId>) {
        let mut tree = RetainedTree::new();
        let root = tree.create_node(NodeKind::Block);
        let kids: Vec<_> = (0..n)
            .map(|_| {
                let kid = tree.create_node(NodeKind::Block);
                tree.append_child(root, kid).unwrap();
                kid
            })
            .collect();
        (tree, root, kids)
    }

    #[test]
    fn test_sibling_navigation() {
        let (tree, root, kids) = tree_with_children(3);
        assert_eq!(tree.first_child(root), Some(kids[0]));
        assert_eq!(tree.next_sibling(kids[0]), Some(kids[1]));
        assert_eq!(tree.next_sibling(kids[2]), None);
        assert_eq!(tree.children(root), kids);
        assert_eq!(tree.parent(kids[1]), Some(root));
    }

    #[test]
    fn test_append_moves_existing_child_to_end() {
        let (mut tree, root, kids) = tree_with_children(3);
        tree.append_child(root, kids[0]).unwrap();
        assert_eq!(tree.children(root), vec![kids[1], kids[2], kids[0]]);
        assert!(tree.stats().removed.is_empty());
    }

    #[test]
    fn test_insert_before_reference() {
        let (mut tree, root, kids) = tree_with_children(2);
        let fresh = tree.create_node(NodeKind::Surface);
        tree.insert_before(root, fresh, Some(kids[1])).unwrap();
        assert_eq!(tree.children(root), vec![kids[0], fresh, kids[1]]);
        assert_eq!(tree.stats().created(NodeKind::Surface), 1);
    }

    #[test]
    fn test_remove_drops_subtree() {
        let (mut tree, root, kids) = tree_with_children(2);
        let grandchild = tree.create_node(NodeKind::Image);
        tree.append_child(kids[0], grandchild).unwrap();

        tree.remove_child(root, kids[0]).unwrap();
        assert!(!tree.contains(kids[0]));
        assert!(!tree.contains(grandchild));
        assert_eq!(tree.stats().removed, vec![kids[0]]);
    }

    #[test]
    fn test_replace_child_keeps_position() {
        let (mut tree, root, kids) = tree_with_children(3);
        let fresh = tree.create_node(NodeKind::Block);
        tree.replace_child(root, fresh, kids[1]).unwrap();
        assert_eq!(tree.children(root), vec![kids[0], fresh, kids[2]]);
        assert!(!tree.contains(kids[1]));
        assert_eq!(tree.stats().replaced, 1);
    }

    #[test]
    fn test_detach_keeps_node_alive() {
        let (mut tree, root, kids) = tree_with_children(2);
        tree.detach(kids[0]);
        assert!(tree.contains(kids[0]));
        assert_eq!(tree.parent(kids[0]), None);
        assert_eq!(tree.children(root), vec![kids[1]]);
        assert!(tree.stats().removed.is_empty());
    }

    #[test]
    fn test_cycles_are_rejected() {
        let (mut tree, root, kids) = tree_with_children(1);
        assert_eq!(
            tree.append_child(kids[0], root),
            Err(TapestryError::Cycle(root))
        );
    }

    #[test]
    fn test_missing_nodes_error() {
        let (mut tree, root, kids) = tree_with_children(1);
        tree.remove_child(root, kids[0]).unwrap();
        assert_eq!(
            tree.set_style(kids[0], StyleProp::Width, StyleValue::Px(1.0)),
            Err(TapestryError::MissingNode(kids[0]))
        );
        assert_eq!(
            tree.remove_child(root, kids[0]),
            Err(TapestryError::MissingNode(kids[0]))
        );
    }

    #[test]
    fn test_snapshot_ignores_style_insertion_order() {
        let mut a = RetainedTree::new();
        let na = a.create_node(NodeKind::Block);
        a.set_style(na, StyleProp::Width, StyleValue::Px(1.0)).unwrap();
        a.set_style(na, StyleProp::Height, StyleValue::Px(2.0)).unwrap();

        let mut b = RetainedTree::new();
        let nb = b.create_node(NodeKind::Block);
        b.set_style(nb, StyleProp::Height, StyleValue::Px(2.0)).unwrap();
        b.set_style(nb, StyleProp::Width, StyleValue::Px(1.0)).unwrap();

        assert_eq!(a.snapshot(na), b.snapshot(nb));
    }

    #[test]
    fn test_surface_nodes_own_a_surface() {
        let mut tree = RetainedTree::new().with_native_dash(true);
        let surface = tree.create_node(NodeKind::Surface);
        let block = tree.create_node(NodeKind::Block);
        assert!(tree.surface_mut(block).is_none());
        let s = tree.surface_mut(surface).unwrap();
        assert!(s.supports_line_dash());
        s.stroke();
        assert_eq!(tree.surface(surface).unwrap().commands().len(), 1);
    }
}
