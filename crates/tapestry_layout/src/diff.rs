//! Layout Tree Differ
//!
//! Reconciles a new [`LayoutElement`] value against the retained subtree that
//! was rendered from the previous one:
//!
//! - **Identity fast path**: shared content only patches properties
//! - **Same-kind patching**: markup, plain images, flows, containers and
//!   embedded renderables are updated in place
//! - **Cache misses**: kind changes, flow length changes, and retained nodes
//!   that are missing or of the wrong kind fall back to a fresh render
//!
//! Children are matched by position only. The result is always observably
//! identical to `render(next)`.
//!
//! # Example
//!
//! ```rust
//! use tapestry_core::{MemoryBackend, PlatformTree, StyleProp, StyleValue};
//! use tapestry_layout::prelude::*;
//!
//! let mut backend = MemoryBackend::new();
//! let before = beside(spacer(10, 10), spacer(20, 10));
//! let node = render(&mut backend.host(), &before);
//!
//! let after = beside(spacer(10, 10), spacer(30, 10));
//! let node2 = update(&mut backend.host(), node, &before, &after);
//!
//! assert_eq!(node, node2);
//! assert_eq!(backend.tree.style(node, StyleProp::Width), Some(StyleValue::Px(40.0)));
//! ```

use smallvec::SmallVec;
use tapestry_core::{
    Attr, Host, NodeId, NodeKind, PlatformTree, Result, StyleProp, StyleValue, TapestryError,
};

use crate::element::{Content, Direction, ImageStyle, LayoutElement};
use crate::position::{apply_placement, resolve};
use crate::render::{
    apply_direction, render, render_content, set_props, set_text_align, try_render, wrap_link,
};

/// Update the subtree at `live`, rendered from `previous`, to show `next`.
///
/// Returns the node now representing `next`. When it differs from `live`,
/// it has already taken `live`'s place in its parent (or `live` has been
/// released if it had none).
pub fn update(
    host: &mut Host<'_>,
    live: NodeId,
    previous: &LayoutElement,
    next: &LayoutElement,
) -> NodeId {
    match try_update(host, live, previous, next) {
        Ok(node) => node,
        Err(err) => {
            tracing::debug!(%err, kind = next.content().kind_name(), "Cache miss, rendering fresh");
            let fresh = render(host, next);
            if let Err(err) = put_in_place(host.tree, live, fresh) {
                tracing::debug!(%err, "Could not replace stale node");
            }
            fresh
        }
    }
}

fn try_update(
    host: &mut Host<'_>,
    live: NodeId,
    previous: &LayoutElement,
    next: &LayoutElement,
) -> Result<NodeId> {
    let kind = host.tree.kind(live).ok_or(TapestryError::MissingNode(live))?;
    if previous.href().is_empty() && !next.href().is_empty() {
        // the parent's placement styles sit on `live` and belong on the new link
        tracing::debug!(?live, "Link added, rendering fresh");
        let fresh = try_render(host, next)?;
        put_in_place(host.tree, live, fresh)?;
        return Ok(fresh);
    }
    let link = if previous.href().is_empty() {
        None
    } else if kind == NodeKind::Link {
        Some(live)
    } else {
        return Err(TapestryError::UnexpectedKind {
            node: live,
            expected: NodeKind::Link,
            found: kind,
        });
    };

    let inner = match link {
        Some(link) => host
            .tree
            .first_child(link)
            .ok_or(TapestryError::MissingNode(link))?,
        None => live,
    };

    let content = update_content(host, inner, previous, next)?;
    if content == inner {
        patch_props(host.tree, inner, previous, next)?;
    } else {
        set_props(host.tree, next, content)?;
        put_in_place(host.tree, inner, content)?;
    }

    relink(host.tree, link, content, next.href())
}

/// Put `new` where `old` is, dropping `old`
fn put_in_place(tree: &mut dyn PlatformTree, old: NodeId, new: NodeId) -> Result<()> {
    if old == new || tree.kind(old).is_none() {
        return Ok(());
    }
    match tree.parent(old) {
        Some(parent) => tree.replace_child(parent, new, old),
        None => {
            tree.release(old);
            Ok(())
        }
    }
}

fn expect_kind(tree: &dyn PlatformTree, node: NodeId, expected: NodeKind) -> Result<()> {
    let found = tree.kind(node).ok_or(TapestryError::MissingNode(node))?;
    if found != expected {
        return Err(TapestryError::UnexpectedKind {
            node,
            expected,
            found,
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Content
// ─────────────────────────────────────────────────────────────────────────────

fn update_content(
    host: &mut Host<'_>,
    node: NodeId,
    previous: &LayoutElement,
    next: &LayoutElement,
) -> Result<NodeId> {
    let cropped = matches!(
        next.content(),
        Content::Image {
            style: ImageStyle::Cropped(..),
            ..
        }
    );
    // crop geometry is computed from the element size
    if previous.same_content(next) && !(cropped && previous.size() != next.size()) {
        tracing::trace!(?node, "Content unchanged, patching properties");
        return Ok(node);
    }

    match (previous.content(), next.content()) {
        (Content::Spacer, Content::Spacer) => Ok(node),

        (
            Content::Markup {
                html: old_html,
                align: old_align,
            },
            Content::Markup { html, align },
        ) => {
            if old_html != html {
                host.tree.set_markup(node, html)?;
            }
            if old_align != align {
                set_text_align(host.tree, node, *align)?;
            }
            Ok(node)
        }

        (
            Content::Image {
                style: ImageStyle::Plain,
                src: old_src,
                ..
            },
            Content::Image {
                style: ImageStyle::Plain,
                src,
                ..
            },
        ) => {
            expect_kind(host.tree, node, NodeKind::Image)?;
            if old_src != src {
                host.tree.set_attribute(node, Attr::Src, src)?;
                host.tree.set_attribute(node, Attr::Name, src)?;
            }
            Ok(node)
        }

        (
            Content::Image {
                style: old_style,
                width: old_width,
                height: old_height,
                src: old_src,
            },
            Content::Image {
                style,
                width,
                height,
                src,
            },
        ) => {
            let unchanged = old_style == style
                && old_width == width
                && old_height == height
                && old_src == src
                && previous.size() == next.size();
            if unchanged {
                Ok(node)
            } else {
                tracing::debug!(?style, "Styled image changed, rendering fresh");
                render_content(host, next)
            }
        }

        (
            Content::Flow {
                direction: old_direction,
                children: old_children,
            },
            Content::Flow {
                direction,
                children,
            },
        ) => {
            let retained = host.tree.children(node);
            if old_direction != direction
                || old_children.len() != children.len()
                || retained.len() != children.len()
            {
                tracing::debug!(
                    previous = old_children.len(),
                    next = children.len(),
                    retained = retained.len(),
                    "Flow shape changed, rendering fresh"
                );
                return render_content(host, next);
            }
            update_flow(host, node, *direction, &retained, old_children, children)?;
            Ok(node)
        }

        (
            Content::Container {
                child: old_child, ..
            },
            Content::Container { position, child },
        ) => {
            let child_node = host
                .tree
                .first_child(node)
                .ok_or(TapestryError::MissingNode(node))?;
            let child_node = update(host, child_node, old_child, child);
            apply_placement(
                host.tree,
                child_node,
                &resolve(position, child.width(), child.height()),
            )?;
            Ok(node)
        }

        (Content::Embedded(old), Content::Embedded(new))
            if old.as_any().type_id() == new.as_any().type_id() =>
        {
            Ok(new.update(host, node, old.as_ref()))
        }

        (old, new) => {
            tracing::debug!(
                from = old.kind_name(),
                to = new.kind_name(),
                "Content kind changed, rendering fresh"
            );
            render_content(host, next)
        }
    }
}

/// Update flow children by position and re-append them in document order
fn update_flow(
    host: &mut Host<'_>,
    node: NodeId,
    direction: Direction,
    retained: &[NodeId],
    old_children: &[LayoutElement],
    children: &[LayoutElement],
) -> Result<()> {
    let mut placed: SmallVec<[NodeId; 8]> = SmallVec::with_capacity(children.len());
    for (slot, index) in direction.document_order(children.len()).enumerate() {
        let child = update(host, retained[slot], &old_children[index], &children[index]);
        apply_direction(host.tree, direction, child)?;
        placed.push(child);
    }
    for child in placed {
        host.tree.append_child(node, child)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

/// Patch the properties that changed between `previous` and `next`.
///
/// Defaults are removed rather than written, so the node matches a fresh
/// render of `next`.
fn patch_props(
    tree: &mut dyn PlatformTree,
    node: NodeId,
    previous: &LayoutElement,
    next: &LayoutElement,
) -> Result<()> {
    if previous.width() != next.width() {
        tree.set_style(node, StyleProp::Width, StyleValue::Px(next.width() as f32))?;
    }
    if previous.height() != next.height() {
        tree.set_style(node, StyleProp::Height, StyleValue::Px(next.height() as f32))?;
    }
    if previous.opacity() != next.opacity() {
        if next.opacity() == 1.0 {
            tree.remove_style(node, StyleProp::Opacity)?;
        } else {
            tree.set_style(node, StyleProp::Opacity, StyleValue::Number(next.opacity()))?;
        }
    }
    if previous.color() != next.color() {
        match next.color() {
            Some(color) => {
                tree.set_style(node, StyleProp::BackgroundColor, StyleValue::Color(color))?
            }
            None => tree.remove_style(node, StyleProp::BackgroundColor)?,
        }
    }
    if previous.tag() != next.tag() {
        if next.tag().is_empty() {
            tree.remove_attribute(node, Attr::Id)?;
        } else {
            tree.set_attribute(node, Attr::Id, next.tag())?;
        }
    }
    Ok(())
}

/// Retarget or remove the link around `content`
fn relink(
    tree: &mut dyn PlatformTree,
    link: Option<NodeId>,
    content: NodeId,
    href: &str,
) -> Result<NodeId> {
    match link {
        None => wrap_link(tree, content, href),
        Some(link) if href.is_empty() => {
            match tree.parent(link) {
                Some(parent) => {
                    tree.insert_before(parent, content, Some(link))?;
                    tree.remove_child(parent, link)?;
                }
                None => {
                    tree.detach(content);
                    tree.release(link);
                }
            }
            Ok(content)
        }
        Some(link) => {
            if tree.attribute(link, Attr::Href).as_deref() != Some(href) {
                tree.set_attribute(link, Attr::Href, href)?;
            }
            Ok(link)
        }
    }
}
