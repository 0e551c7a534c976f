//! Fresh rendering of layout elements
//!
//! `render` builds a detached retained subtree for an element. The differ
//! falls back to the same functions whenever it cannot reuse a node, so a
//! patched tree and a fresh one are built from one definition.

use tapestry_core::{
    AssetState, Attr, Host, Keyword, NodeId, NodeKind, PlatformTree, Result, StyleProp,
    StyleValue,
};

use crate::element::{Content, Direction, ImageStyle, LayoutElement, TextAlign};
use crate::position::{apply_placement, resolve};

/// Render `element` into a fresh, detached subtree and return its root.
pub fn render(host: &mut Host<'_>, element: &LayoutElement) -> NodeId {
    match try_render(host, element) {
        Ok(node) => node,
        Err(err) => {
            tracing::warn!(%err, kind = element.content().kind_name(), "Fresh render failed");
            host.tree.create_node(NodeKind::Block)
        }
    }
}

pub(crate) fn try_render(host: &mut Host<'_>, element: &LayoutElement) -> Result<NodeId> {
    let node = render_content(host, element)?;
    set_props(host.tree, element, node)?;
    wrap_link(host.tree, node, element.href())
}

/// Render only the content of `element`, without its properties
pub(crate) fn render_content(host: &mut Host<'_>, element: &LayoutElement) -> Result<NodeId> {
    tracing::trace!(kind = element.content().kind_name(), "Rendering content");
    match element.content() {
        Content::Spacer => Ok(host.tree.create_node(NodeKind::Block)),
        Content::Markup { html, align } => {
            let node = host.tree.create_node(NodeKind::Block);
            host.tree.set_markup(node, html)?;
            set_text_align(host.tree, node, *align)?;
            Ok(node)
        }
        Content::Image {
            style,
            width,
            height,
            src,
        } => render_image(host, element, *style, (*width, *height), src),
        Content::Container { position, child } => {
            let node = host.tree.create_node(NodeKind::Block);
            host.tree
                .set_style(node, StyleProp::Position, Keyword::Relative.into())?;
            host.tree
                .set_style(node, StyleProp::Overflow, Keyword::Hidden.into())?;
            let child_node = try_render(host, child)?;
            apply_placement(
                host.tree,
                child_node,
                &resolve(position, child.width(), child.height()),
            )?;
            host.tree.append_child(node, child_node)?;
            Ok(node)
        }
        Content::Flow {
            direction,
            children,
        } => {
            let node = host.tree.create_node(NodeKind::Block);
            for index in direction.document_order(children.len()) {
                let child_node = try_render(host, &children[index])?;
                apply_direction(host.tree, *direction, child_node)?;
                host.tree.append_child(node, child_node)?;
            }
            set_flow_pointer_events(host.tree, *direction, node)?;
            Ok(node)
        }
        Content::Embedded(renderable) => Ok(renderable.render(host)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

/// Set size, opacity, background and tag on a freshly rendered node
pub(crate) fn set_props(
    tree: &mut dyn PlatformTree,
    element: &LayoutElement,
    node: NodeId,
) -> Result<()> {
    tree.set_style(node, StyleProp::Width, StyleValue::Px(element.width() as f32))?;
    tree.set_style(node, StyleProp::Height, StyleValue::Px(element.height() as f32))?;
    if element.opacity() != 1.0 {
        tree.set_style(node, StyleProp::Opacity, StyleValue::Number(element.opacity()))?;
    }
    if let Some(color) = element.color() {
        tree.set_style(node, StyleProp::BackgroundColor, StyleValue::Color(color))?;
    }
    if !element.tag().is_empty() {
        tree.set_attribute(node, Attr::Id, element.tag())?;
    }
    Ok(())
}

/// Wrap `node` in a link when `href` is set
pub(crate) fn wrap_link(tree: &mut dyn PlatformTree, node: NodeId, href: &str) -> Result<NodeId> {
    if href.is_empty() {
        return Ok(node);
    }
    let link = create_link(tree, href)?;
    if let Some(parent) = tree.parent(node) {
        tree.insert_before(parent, link, Some(node))?;
    }
    tree.append_child(link, node)?;
    Ok(link)
}

fn create_link(tree: &mut dyn PlatformTree, href: &str) -> Result<NodeId> {
    let link = tree.create_node(NodeKind::Link);
    tree.set_attribute(link, Attr::Href, href)?;
    tree.set_style(link, StyleProp::Display, Keyword::Block.into())?;
    tree.set_style(link, StyleProp::PointerEvents, Keyword::Auto.into())?;
    Ok(link)
}

pub(crate) fn set_text_align(
    tree: &mut dyn PlatformTree,
    node: NodeId,
    align: Option<TextAlign>,
) -> Result<()> {
    let keyword = match align {
        None => return tree.remove_style(node, StyleProp::TextAlign),
        Some(TextAlign::Left) => Keyword::Left,
        Some(TextAlign::Right) => Keyword::Right,
        Some(TextAlign::Center) => Keyword::Center,
        Some(TextAlign::Justify) => Keyword::Justify,
    };
    tree.set_style(node, StyleProp::TextAlign, keyword.into())
}

/// Placement style of a child inside a flow
pub(crate) fn apply_direction(
    tree: &mut dyn PlatformTree,
    direction: Direction,
    node: NodeId,
) -> Result<()> {
    match direction {
        Direction::Up | Direction::Down => Ok(()),
        Direction::Left | Direction::Right => {
            tree.set_style(node, StyleProp::Float, Keyword::Left.into())
        }
        Direction::Inward | Direction::Outward => {
            tree.set_style(node, StyleProp::Position, Keyword::Absolute.into())
        }
    }
}

fn set_flow_pointer_events(
    tree: &mut dyn PlatformTree,
    direction: Direction,
    node: NodeId,
) -> Result<()> {
    if matches!(direction, Direction::Inward | Direction::Outward) {
        tree.set_style(node, StyleProp::PointerEvents, Keyword::None.into())?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Images
// ─────────────────────────────────────────────────────────────────────────────

fn render_image(
    host: &mut Host<'_>,
    element: &LayoutElement,
    style: ImageStyle,
    intrinsic: (u32, u32),
    src: &str,
) -> Result<NodeId> {
    match style {
        ImageStyle::Plain => {
            let node = host.tree.create_node(NodeKind::Image);
            set_image_source(host.tree, node, src)?;
            Ok(node)
        }
        ImageStyle::Fitted | ImageStyle::Tiled => {
            let node = host.tree.create_node(NodeKind::Block);
            host.tree
                .set_style(node, StyleProp::BackgroundImage, StyleValue::Url(src.to_string()))?;
            if style == ImageStyle::Fitted {
                host.tree
                    .set_style(node, StyleProp::BackgroundSize, Keyword::Cover.into())?;
                host.tree
                    .set_style(node, StyleProp::BackgroundPosition, Keyword::Center.into())?;
                host.tree
                    .set_style(node, StyleProp::BackgroundRepeat, Keyword::NoRepeat.into())?;
            } else {
                host.tree
                    .set_style(node, StyleProp::BackgroundRepeat, Keyword::Repeat.into())?;
            }
            Ok(node)
        }
        ImageStyle::Cropped(x, y) => {
            let node = host.tree.create_node(NodeKind::Block);
            host.tree
                .set_style(node, StyleProp::Overflow, Keyword::Hidden.into())?;
            let img = host.tree.create_node(NodeKind::Image);
            set_image_source(host.tree, img, src)?;

            let crop = CropGeometry {
                offset: (x, y),
                scale: (
                    scale_factor(element.width(), intrinsic.0),
                    scale_factor(element.height(), intrinsic.1),
                ),
            };
            match host.assets.image(src) {
                AssetState::Ready(info) => crop.apply(host.tree, img, info.width, info.height)?,
                AssetState::Loading => {
                    let src_name = src.to_string();
                    host.assets.on_ready(
                        src,
                        Box::new(move |host: &mut Host<'_>| {
                            let AssetState::Ready(info) = host.assets.image(&src_name) else {
                                return;
                            };
                            if let Err(err) = crop.apply(host.tree, img, info.width, info.height) {
                                tracing::debug!(%err, "Cropped image went away before load");
                            }
                        }),
                    );
                }
                AssetState::Failed => {
                    tracing::debug!(src, "Cropped image failed to load");
                }
            }

            host.tree.append_child(node, img)?;
            Ok(node)
        }
    }
}

fn set_image_source(tree: &mut dyn PlatformTree, node: NodeId, src: &str) -> Result<()> {
    tree.set_attribute(node, Attr::Src, src)?;
    tree.set_attribute(node, Attr::Name, src)?;
    tree.set_style(node, StyleProp::Display, Keyword::Block.into())
}

fn scale_factor(size: u32, intrinsic: u32) -> f32 {
    if intrinsic == 0 {
        1.0
    } else {
        size as f32 / intrinsic as f32
    }
}

#[derive(Clone, Copy, Debug)]
struct CropGeometry {
    offset: (i32, i32),
    scale: (f32, f32),
}

impl CropGeometry {
    /// Size and shift the inner image once its natural size is known
    fn apply(
        &self,
        tree: &mut dyn PlatformTree,
        img: NodeId,
        natural_width: f32,
        natural_height: f32,
    ) -> Result<()> {
        let (sw, sh) = self.scale;
        let (x, y) = self.offset;
        tree.set_style(img, StyleProp::Width, StyleValue::Px((natural_width * sw).trunc()))?;
        tree.set_style(img, StyleProp::Height, StyleValue::Px((natural_height * sh).trunc()))?;
        tree.set_style(img, StyleProp::MarginLeft, StyleValue::Px((-(x as f32) * sw).trunc()))?;
        tree.set_style(img, StyleProp::MarginTop, StyleValue::Px((-(y as f32) * sh).trunc()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::*;
    use crate::position::{middle, top_left};
    use tapestry_core::{Color, ImageInfo, Length, MemoryBackend};

    #[test]
    fn test_props_only_set_when_not_default() {
        let mut backend = MemoryBackend::new();
        let plain = render(&mut backend.host(), &spacer(10, 20));
        let tree = &backend.tree;
        assert_eq!(tree.style(plain, StyleProp::Width), Some(StyleValue::Px(10.0)));
        assert_eq!(tree.style(plain, StyleProp::Height), Some(StyleValue::Px(20.0)));
        assert_eq!(tree.style(plain, StyleProp::Opacity), None);
        assert_eq!(tree.style(plain, StyleProp::BackgroundColor), None);
        assert_eq!(tree.attribute(plain, Attr::Id), None);

        let styled = spacer(1, 1).with_opacity(0.5).with_color(Color::RED).with_tag("a");
        let node = render(&mut backend.host(), &styled);
        let tree = &backend.tree;
        assert_eq!(tree.style(node, StyleProp::Opacity), Some(StyleValue::Number(0.5)));
        assert_eq!(
            tree.style(node, StyleProp::BackgroundColor),
            Some(StyleValue::Color(Color::RED))
        );
        assert_eq!(tree.attribute(node, Attr::Id).as_deref(), Some("a"));
    }

    #[test]
    fn test_link_wraps_rendered_node() {
        let mut backend = MemoryBackend::new();
        let node = render(&mut backend.host(), &spacer(5, 5).with_link("https://x"));
        let tree = &backend.tree;
        assert_eq!(tree.kind(node), Some(NodeKind::Link));
        assert_eq!(tree.attribute(node, Attr::Href).as_deref(), Some("https://x"));
        let inner = tree.first_child(node).unwrap();
        assert_eq!(tree.style(inner, StyleProp::Width), Some(StyleValue::Px(5.0)));
    }

    #[test]
    fn test_reversed_flow_appends_last_child_first() {
        let mut backend = MemoryBackend::new();
        let e = flow(Direction::Left, vec![spacer(1, 1), spacer(2, 1), spacer(3, 1)]);
        let node = render(&mut backend.host(), &e);
        let tree = &backend.tree;
        let widths: Vec<_> = tree
            .children(node)
            .into_iter()
            .map(|c| tree.style(c, StyleProp::Width))
            .collect();
        assert_eq!(
            widths,
            vec![
                Some(StyleValue::Px(3.0)),
                Some(StyleValue::Px(2.0)),
                Some(StyleValue::Px(1.0))
            ]
        );
        for child in tree.children(node) {
            assert_eq!(tree.style(child, StyleProp::Float), Some(Keyword::Left.into()));
        }
    }

    #[test]
    fn test_layers_disable_pointer_events() {
        let mut backend = MemoryBackend::new();
        let node = render(&mut backend.host(), &layers(vec![spacer(1, 1)]));
        let tree = &backend.tree;
        assert_eq!(tree.style(node, StyleProp::PointerEvents), Some(Keyword::None.into()));
        let child = tree.first_child(node).unwrap();
        assert_eq!(tree.style(child, StyleProp::Position), Some(Keyword::Absolute.into()));
    }

    #[test]
    fn test_container_places_child() {
        let mut backend = MemoryBackend::new();
        let e = container(100, 100, middle(), spacer(10, 10));
        let node = render(&mut backend.host(), &e);
        let tree = &backend.tree;
        assert_eq!(tree.style(node, StyleProp::Overflow), Some(Keyword::Hidden.into()));
        let child = tree.first_child(node).unwrap();
        assert_eq!(tree.style(child, StyleProp::Left), Some(Length::Percent(50.0).into()));
        assert!(matches!(
            tree.style(child, StyleProp::Transform),
            Some(StyleValue::Transform(_))
        ));

        let e = container(100, 100, top_left(), spacer(10, 10));
        let node = render(&mut backend.host(), &e);
        let child = backend.tree.first_child(node).unwrap();
        assert_eq!(backend.tree.style(child, StyleProp::Transform), None);
    }

    #[test]
    fn test_cropped_image_waits_for_asset() {
        let mut backend = MemoryBackend::new();
        let e = cropped_image((10, 20), 50, 50, "sheet.png").with_size(100, 100);
        let node = render(&mut backend.host(), &e);
        let img = backend.tree.first_child(node).unwrap();
        assert_eq!(backend.tree.style(img, StyleProp::Width), None);

        let callbacks = backend
            .assets
            .resolve("sheet.png", ImageInfo::new(200.0, 100.0));
        assert_eq!(callbacks.len(), 1);
        for callback in callbacks {
            callback(&mut backend.host());
        }

        let tree = &backend.tree;
        assert_eq!(tree.style(img, StyleProp::Width), Some(StyleValue::Px(400.0)));
        assert_eq!(tree.style(img, StyleProp::Height), Some(StyleValue::Px(200.0)));
        assert_eq!(tree.style(img, StyleProp::MarginLeft), Some(StyleValue::Px(-20.0)));
        assert_eq!(tree.style(img, StyleProp::MarginTop), Some(StyleValue::Px(-40.0)));
    }

    #[test]
    fn test_fitted_image_uses_background() {
        let mut backend = MemoryBackend::new();
        let node = render(&mut backend.host(), &fitted_image(10, 10, "a.png"));
        let tree = &backend.tree;
        assert_eq!(tree.kind(node), Some(NodeKind::Block));
        assert_eq!(
            tree.style(node, StyleProp::BackgroundImage),
            Some(StyleValue::Url("a.png".into()))
        );
        assert_eq!(tree.style(node, StyleProp::BackgroundSize), Some(Keyword::Cover.into()));
    }
}
