//! Scene-Graph Incremental Renderer
//!
//! A collage owns one container node. Its children are drawing surfaces and
//! wrappers around embedded layout elements, in form order. Each pass walks
//! the form tree against those children with a cursor:
//!
//! - **Leaves** draw on the current surface, reusing the surface under the
//!   cursor or inserting a new one there
//! - **Elements** reuse the wrapper under the cursor through the layout
//!   differ, or insert a freshly rendered one
//! - **Groups** push a combined alpha and transform that every surface drawn
//!   inside them replays before its first draw
//!
//! Children left after the cursor are removed at the end of the pass.

use std::f32::consts::TAU;

use smallvec::SmallVec;
use tapestry_core::{
    Affine2D, AssetState, DrawingSurface, Host, Keyword, LineCap, LineJoin, NodeId, NodeKind,
    Paint, PlatformTree, Point, Rect, Result, Size, StyleProp, StyleValue, TapestryError,
};
use tapestry_layout::LayoutElement;

use crate::collage::Collage;
use crate::dash::{self, TraceSegment};
use crate::form::{BasicForm, Cap, FillStyle, Form, Join, LineStyle, ShapeStyle, Text};

/// Render a collage into a fresh container node
pub(crate) fn render(host: &mut Host<'_>, collage: &Collage) -> NodeId {
    let node = host.tree.create_node(NodeKind::Block);
    let styled = host
        .tree
        .set_style(node, StyleProp::Position, Keyword::Relative.into())
        .and_then(|_| {
            host.tree
                .set_style(node, StyleProp::Overflow, Keyword::Hidden.into())
        });
    if let Err(err) = styled {
        tracing::warn!(%err, "Could not style collage container");
    }
    update(host, collage, node, &[], true);
    node
}

/// Bring the children of `container`, last drawn from `previous`, up to date
/// with `collage`.
///
/// A pass that fails on unexpected children clears the container and draws
/// from scratch.
pub(crate) fn update(
    host: &mut Host<'_>,
    collage: &Collage,
    container: NodeId,
    previous: &[Form],
    retrigger: bool,
) {
    let Err(err) = run_pass(host, collage, container, previous, retrigger) else {
        return;
    };

    tracing::debug!(%err, "Collage children unusable, drawing from scratch");
    for child in host.tree.children(container) {
        if let Err(err) = host.tree.remove_child(container, child) {
            tracing::debug!(%err, "Could not clear collage child");
        }
    }
    if let Err(err) = run_pass(host, collage, container, &[], retrigger) {
        tracing::warn!(%err, "Collage redraw failed");
    }
}

/// Redraw after an asset arrived. Never schedules another redraw.
///
/// Skipped when the container is gone or a newer collage has been drawn into
/// it since `generation` was armed.
fn redraw(host: &mut Host<'_>, collage: &Collage, container: NodeId, generation: u64) {
    if host.tree.kind(container).is_none() {
        tracing::debug!(?container, "Collage is gone, skipping redraw");
        return;
    }
    if collage.generation() != generation {
        tracing::debug!(?container, "Collage was superseded, skipping redraw");
        return;
    }
    update(host, collage, container, collage.forms(), false);
}

fn run_pass(
    host: &mut Host<'_>,
    collage: &Collage,
    container: NodeId,
    previous: &[Form],
    retrigger: bool,
) -> Result<()> {
    host.tree
        .kind(container)
        .ok_or(TapestryError::MissingNode(container))?;

    let mut state = UpdateState::new(host, collage, container, previous, retrigger);
    for form in collage.forms() {
        state.visit(host, form)?;
    }
    state.prune(host)
}

fn collect_elements<'f>(forms: &'f [Form], out: &mut Vec<&'f LayoutElement>) {
    for form in forms {
        match &form.basic {
            BasicForm::Element(element) => out.push(element),
            BasicForm::Group { children, .. } => collect_elements(children, out),
            _ => {}
        }
    }
}

fn surface_of(tree: &mut dyn PlatformTree, node: NodeId) -> Result<&mut dyn DrawingSurface> {
    let found = tree.kind(node).ok_or(TapestryError::MissingNode(node))?;
    tree.surface_mut(node).ok_or(TapestryError::UnexpectedKind {
        node,
        expected: NodeKind::Surface,
        found,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Update State
// ─────────────────────────────────────────────────────────────────────────────

/// Alpha and transform accumulated through enclosing groups
#[derive(Clone, Copy, Debug)]
struct Level {
    alpha: f32,
    transform: Affine2D,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            transform: Affine2D::IDENTITY,
        }
    }
}

/// State of one pass. Never outlives it.
struct UpdateState<'p> {
    collage: &'p Collage,
    container: NodeId,
    device_pixel_ratio: f32,
    /// Collage-to-device transform every surface starts from
    base: Affine2D,
    /// Next retained child not yet visited
    cursor: Option<NodeId>,
    /// Surface leaves currently draw on
    surface: Option<NodeId>,
    stack: SmallVec<[Level; 8]>,
    retrigger: bool,
    /// Sources with a redraw already registered in this pass
    armed: SmallVec<[String; 2]>,
    /// Elements of the previous forms, in the order their wrappers appear
    previous_elements: std::vec::IntoIter<&'p LayoutElement>,
}

impl<'p> UpdateState<'p> {
    fn new(
        host: &Host<'_>,
        collage: &'p Collage,
        container: NodeId,
        previous: &'p [Form],
        retrigger: bool,
    ) -> Self {
        let mut elements = Vec::new();
        collect_elements(previous, &mut elements);
        let ratio = host.config.device_pixel_ratio;

        Self {
            collage,
            container,
            device_pixel_ratio: ratio,
            base: Affine2D::collage_to_device(collage.width(), collage.height(), ratio),
            cursor: host.tree.first_child(container),
            surface: None,
            stack: SmallVec::new(),
            retrigger: retrigger && host.config.retrigger_assets,
            armed: SmallVec::new(),
            previous_elements: elements.into_iter(),
        }
    }

    fn top(&self) -> Level {
        self.stack.last().copied().unwrap_or_default()
    }

    fn visit(&mut self, host: &mut Host<'_>, form: &Form) -> Result<()> {
        match &form.basic {
            BasicForm::Element(element) => self.visit_element(host, form, element),
            BasicForm::Group { matrix, children } => {
                self.visit_group(host, form, matrix, children)
            }
            _ => self.draw_leaf(host, form),
        }
    }

    fn visit_group(
        &mut self,
        host: &mut Host<'_>,
        form: &Form,
        matrix: &Affine2D,
        children: &[Form],
    ) -> Result<()> {
        let top = self.top();
        let level = Level {
            alpha: top.alpha * form.alpha,
            transform: top
                .transform
                .then(&form.local_transform().then(matrix)),
        };
        self.stack.push(level);

        if let Some(node) = self.surface {
            let surface = surface_of(host.tree, node)?;
            surface.save();
            surface.set_transform(self.base.then(&level.transform));
            surface.set_global_alpha(level.alpha);
        }

        for child in children {
            self.visit(host, child)?;
        }

        if let Some(node) = self.surface {
            surface_of(host.tree, node)?.restore();
        }
        self.stack.pop();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Surfaces
    // ─────────────────────────────────────────────────────────────────────────

    /// The surface leaves draw on, acquiring one at the cursor if needed
    fn current_surface(&mut self, host: &mut Host<'_>) -> Result<NodeId> {
        if let Some(node) = self.surface {
            return Ok(node);
        }

        let node = match self.cursor {
            Some(cursor) if host.tree.kind(cursor) == Some(NodeKind::Surface) => {
                tracing::trace!(?cursor, "Reusing surface");
                self.cursor = host.tree.next_sibling(cursor);
                cursor
            }
            cursor => {
                let node = host.tree.create_node(NodeKind::Surface);
                host.tree.insert_before(self.container, node, cursor)?;
                tracing::trace!(?node, "Inserted surface");
                node
            }
        };

        let (width, height) = (self.collage.width(), self.collage.height());
        host.tree
            .set_style(node, StyleProp::Width, StyleValue::Px(width))?;
        host.tree
            .set_style(node, StyleProp::Height, StyleValue::Px(height))?;
        host.tree
            .set_style(node, StyleProp::Display, Keyword::Block.into())?;
        host.tree
            .set_style(node, StyleProp::Position, Keyword::Absolute.into())?;

        let surface = surface_of(host.tree, node)?;
        surface.reset(Size::new(width, height).scaled(self.device_pixel_ratio));
        surface.set_transform(self.base);
        for level in &self.stack {
            surface.save();
            surface.set_transform(self.base.then(&level.transform));
            surface.set_global_alpha(level.alpha);
        }

        self.surface = Some(node);
        Ok(node)
    }

    /// Whether the asset `src` can be drawn now, arming a redraw if it is loading
    fn asset_ready(&mut self, host: &mut Host<'_>, src: &str) -> bool {
        match host.assets.image(src) {
            AssetState::Ready(_) => true,
            AssetState::Failed => false,
            AssetState::Loading => {
                if self.retrigger && !self.armed.iter().any(|armed| armed == src) {
                    self.armed.push(src.to_string());
                    let collage = self.collage.clone();
                    let container = self.container;
                    let generation = collage.generation();
                    host.assets.on_ready(
                        src,
                        Box::new(move |host: &mut Host<'_>| {
                            redraw(host, &collage, container, generation)
                        }),
                    );
                }
                false
            }
        }
    }

    fn draw_leaf(&mut self, host: &mut Host<'_>, form: &Form) -> Result<()> {
        let ready = match &form.basic {
            BasicForm::Image { src, .. }
            | BasicForm::Shape {
                style: ShapeStyle::Fill(FillStyle::Texture(src)),
                ..
            } => self.asset_ready(host, src),
            _ => true,
        };

        let node = self.current_surface(host)?;
        let alpha = self.top().alpha * form.alpha;
        let native_dash = host.config.native_line_dash;

        let surface = surface_of(host.tree, node)?;
        surface.save();
        if form.x != 0.0 || form.y != 0.0 {
            surface.translate(form.x, form.y);
        }
        let theta = form.theta % TAU;
        if theta != 0.0 {
            surface.rotate(theta);
        }
        if form.scale != 1.0 {
            surface.scale(form.scale, form.scale);
        }
        surface.set_global_alpha(alpha);
        if ready {
            draw_basic(surface, &form.basic, native_dash);
        }
        surface.restore();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Elements
    // ─────────────────────────────────────────────────────────────────────────

    fn visit_element(
        &mut self,
        host: &mut Host<'_>,
        form: &Form,
        element: &LayoutElement,
    ) -> Result<()> {
        let reusable = self
            .cursor
            .filter(|cursor| host.tree.kind(*cursor) == Some(NodeKind::Wrapper));
        let previous = match reusable {
            Some(_) => self.previous_elements.next(),
            None => None,
        };

        let (wrapper, inner) = match (reusable, previous) {
            (Some(wrapper), Some(previous)) => {
                let live = host
                    .tree
                    .first_child(wrapper)
                    .ok_or(TapestryError::MissingNode(wrapper))?;
                // a replacement lands in the wrapper
                let inner = tapestry_layout::update(host, live, previous, element);
                self.cursor = host.tree.next_sibling(wrapper);
                tracing::trace!(?wrapper, "Updated embedded element");
                (wrapper, inner)
            }
            _ => {
                let wrapper = host.tree.create_node(NodeKind::Wrapper);
                let inner = tapestry_layout::render(host, element);
                host.tree.append_child(wrapper, inner)?;
                host.tree.insert_before(self.container, wrapper, self.cursor)?;
                tracing::trace!(?wrapper, "Inserted embedded element");
                (wrapper, inner)
            }
        };

        let natural = natural_size(host, inner, element);

        let top = self.top();
        let flip = Affine2D::scale(1.0, -1.0);
        let transform = Affine2D::translation(
            (self.collage.width() - natural.width) / 2.0,
            (self.collage.height() - natural.height) / 2.0,
        )
        .then(&flip)
        .then(&top.transform)
        .then(&form.local_transform())
        .then(&flip);

        host.tree
            .set_style(wrapper, StyleProp::Position, Keyword::Absolute.into())?;
        host.tree
            .set_style(wrapper, StyleProp::Width, StyleValue::Px(natural.width))?;
        host.tree
            .set_style(wrapper, StyleProp::Height, StyleValue::Px(natural.height))?;
        host.tree
            .set_style(wrapper, StyleProp::Transform, StyleValue::Transform(transform))?;
        host.tree.set_style(
            wrapper,
            StyleProp::Opacity,
            StyleValue::Number(top.alpha * form.alpha),
        )?;

        // later leaves draw on a surface after this element
        self.surface = None;
        Ok(())
    }

    /// Remove every child from the cursor on, first to last
    fn prune(&mut self, host: &mut Host<'_>) -> Result<()> {
        let mut stale: SmallVec<[NodeId; 4]> = SmallVec::new();
        let mut next = self.cursor;
        while let Some(node) = next {
            stale.push(node);
            next = host.tree.next_sibling(node);
        }
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "Pruning stale collage children");
        }
        for node in stale {
            host.tree.remove_child(self.container, node)?;
        }
        self.cursor = None;
        Ok(())
    }
}

/// Size of an embedded element: its pixel styles, else the measurer, else
/// its declared size
fn natural_size(host: &Host<'_>, inner: NodeId, element: &LayoutElement) -> Size {
    let styled = host
        .tree
        .style(inner, StyleProp::Width)
        .and_then(|v| v.as_px())
        .zip(
            host.tree
                .style(inner, StyleProp::Height)
                .and_then(|v| v.as_px()),
        )
        .map(|(width, height)| Size::new(width, height));

    styled
        .or_else(|| host.measure.measure(&*host.tree, inner))
        .filter(Size::is_usable)
        .unwrap_or_else(|| Size::new(element.width() as f32, element.height() as f32))
}

// ─────────────────────────────────────────────────────────────────────────────
// Drawing
// ─────────────────────────────────────────────────────────────────────────────

fn draw_basic(surface: &mut dyn DrawingSurface, basic: &BasicForm, native_dash: bool) {
    match basic {
        BasicForm::Path { line, points } => stroke_points(surface, line, points, false, native_dash),
        BasicForm::Shape {
            style: ShapeStyle::Line(line),
            points,
        } => stroke_points(surface, line, points, true, native_dash),
        BasicForm::Shape {
            style: ShapeStyle::Fill(fill),
            points,
        } => fill_points(surface, fill, points),
        BasicForm::Text(text) => draw_text(surface, text, None),
        BasicForm::OutlinedText { line, text } => draw_text(surface, text, Some(line)),
        BasicForm::Image {
            width,
            height,
            crop,
            src,
        } => {
            surface.scale(1.0, -1.0);
            surface.draw_image(
                src,
                Rect::new(crop.0, crop.1, *width, *height),
                Rect::new(-width / 2.0, -height / 2.0, *width, *height),
            );
        }
        BasicForm::Element(_) | BasicForm::Group { .. } => {}
    }
}

fn apply_line_style(surface: &mut dyn DrawingSurface, line: &LineStyle) {
    surface.set_line_width(line.width);
    surface.set_line_cap(match line.cap {
        Cap::Flat => LineCap::Butt,
        Cap::Round => LineCap::Round,
        Cap::Padded => LineCap::Square,
    });
    match line.join {
        Join::Smooth => surface.set_line_join(LineJoin::Round),
        Join::Sharp(limit) => {
            surface.set_line_join(LineJoin::Miter);
            surface.set_miter_limit(limit);
        }
        Join::Clipped => surface.set_line_join(LineJoin::Bevel),
    }
    surface.set_stroke_style(Paint::Solid(line.color));
}

fn outline(surface: &mut dyn DrawingSurface, points: &[Point], closed: bool) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    surface.move_to(*first);
    for point in rest {
        surface.line_to(*point);
    }
    if closed {
        surface.line_to(*first);
    }
}

fn stroke_points(
    surface: &mut dyn DrawingSurface,
    line: &LineStyle,
    points: &[Point],
    closed: bool,
    native_dash: bool,
) {
    if points.len() < 2 {
        return;
    }
    apply_line_style(surface, line);
    surface.begin_path();

    match dash::sanitize(&line.dashing) {
        Some(pattern) if native_dash && surface.supports_line_dash() => {
            surface.set_line_dash(pattern, line.dash_offset);
            outline(surface, points, closed);
        }
        Some(pattern) => {
            surface.move_to(points[0]);
            for segment in dash::trace(points, pattern, closed) {
                match segment {
                    TraceSegment::Draw { to, .. } => surface.line_to(to),
                    TraceSegment::Skip { to, .. } => surface.move_to(to),
                }
            }
        }
        None => outline(surface, points, closed),
    }

    surface.scale(1.0, -1.0);
    surface.stroke();
}

fn fill_points(surface: &mut dyn DrawingSurface, fill: &FillStyle, points: &[Point]) {
    if points.len() < 2 {
        return;
    }
    let paint = match fill {
        FillStyle::Solid(color) => Paint::Solid(*color),
        FillStyle::Texture(src) => Paint::Pattern(src.clone()),
        FillStyle::Gradient(gradient) => Paint::Gradient(gradient.flipped_y()),
    };
    surface.set_fill_style(paint);
    surface.begin_path();
    outline(surface, points, true);
    surface.scale(1.0, -1.0);
    surface.fill();
}

fn draw_text(surface: &mut dyn DrawingSurface, text: &Text, line: Option<&LineStyle>) {
    surface.set_font(&text.style.font_string());
    match line {
        Some(line) => apply_line_style(surface, line),
        None => surface.set_fill_style(Paint::Solid(text.style.color)),
    }
    let width = surface.measure_text(&text.content);
    surface.scale(1.0, -1.0);
    let origin = Point::new(-width / 2.0, text.style.font_size() / 2.0);
    match line {
        Some(_) => surface.stroke_text(&text.content, origin),
        None => surface.fill_text(&text.content, origin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collage::collage;
    use crate::form::*;
    use tapestry_core::{
        AssetCallback, AssetLoader, Color, EngineConfig, ImageInfo, MemoryBackend, RecordingSurface,
        RetainedTree, StyleMeasure, SurfaceCommand,
    };
    use tapestry_layout::element::{markup, spacer};
    use tapestry_layout::Renderable;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn square_form() -> Form {
        filled(Color::RED, square(4.0))
    }

    fn kinds(tree: &RetainedTree, node: NodeId) -> Vec<NodeKind> {
        tree.children(node)
            .into_iter()
            .filter_map(|child| tree.kind(child))
            .collect()
    }

    fn surface<'t>(tree: &'t RetainedTree, node: NodeId) -> &'t RecordingSurface {
        tree.surface(node).expect("surface node")
    }

    fn draw(backend: &mut MemoryBackend, forms: Vec<Form>) -> (NodeId, Collage) {
        let collage = Collage::new(100.0, 50.0, forms);
        let node = collage.render(&mut backend.host());
        (node, collage)
    }

    fn redraw_with(
        backend: &mut MemoryBackend,
        node: NodeId,
        previous: &Collage,
        forms: Vec<Form>,
    ) -> Collage {
        let next = Collage::new(100.0, 50.0, forms);
        backend.tree.reset_stats();
        let returned = next.update(&mut backend.host(), node, previous);
        assert_eq!(returned, node);
        next
    }

    #[test]
    fn test_nested_alpha_is_independent_of_surface_count() {
        init_tracing();
        let nested = |inner: Vec<Form>| vec![group(vec![group(inner).with_alpha(0.4)]).with_alpha(0.5)];

        let mut backend = MemoryBackend::new();
        let (node, _) = draw(&mut backend, nested(vec![square_form()]));
        let children = backend.tree.children(node);
        assert_eq!(children.len(), 1);
        assert_eq!(surface(&backend.tree, children[0]).draw_alphas(), vec![0.2]);

        let mut backend = MemoryBackend::new();
        let (node, _) = draw(
            &mut backend,
            nested(vec![square_form(), to_form(spacer(10, 10)), square_form()]),
        );
        assert_eq!(
            kinds(&backend.tree, node),
            vec![NodeKind::Surface, NodeKind::Wrapper, NodeKind::Surface]
        );
        let children = backend.tree.children(node);
        let first = surface(&backend.tree, children[0]);
        let second = surface(&backend.tree, children[2]);
        assert_eq!(first.draw_alphas(), vec![0.2]);
        assert_eq!(second.draw_alphas(), vec![0.2]);

        let fill_transform = |s: &RecordingSurface| {
            s.commands().iter().find_map(|c| match c {
                SurfaceCommand::Fill { transform, .. } => Some(*transform),
                _ => None,
            })
        };
        assert_eq!(fill_transform(first), fill_transform(second));
        assert_eq!(
            backend.tree.style(children[1], StyleProp::Opacity),
            Some(StyleValue::Number(0.2))
        );
    }

    #[test]
    fn test_group_transform_reaches_new_surfaces() {
        let mut backend = MemoryBackend::new();
        let forms = vec![group(vec![to_form(spacer(2, 2)), square_form()]).move_by(10.0, 5.0)];
        let (node, _) = draw(&mut backend, forms);

        let children = backend.tree.children(node);
        let commands = surface(&backend.tree, children[1]).commands();
        let base = Affine2D::collage_to_device(100.0, 50.0, 1.0);
        assert_eq!(commands[0], SurfaceCommand::SetTransform(base));
        assert_eq!(commands[1], SurfaceCommand::Save);
        assert_eq!(
            commands[2],
            SurfaceCommand::SetTransform(base.then(&Affine2D::translation(10.0, 5.0)))
        );
    }

    #[test]
    fn test_unchanged_forms_reuse_every_child() {
        let forms = vec![
            square_form(),
            traced(dashed(Color::BLUE), segment((0.0, 0.0), (20.0, 0.0))),
            to_form(markup(20, 10, "hello")),
            square_form().move_x(3.0),
            group(vec![square_form(), to_form(spacer(4, 4))]).with_alpha(0.5),
        ];
        let mut backend = MemoryBackend::new();
        let (node, previous) = draw(&mut backend, forms.clone());
        let before = backend.tree.children(node);

        redraw_with(&mut backend, node, &previous, forms);
        assert_eq!(backend.tree.stats().created_total(), 0);
        assert!(backend.tree.stats().removed.is_empty());
        assert_eq!(backend.tree.children(node), before);
    }

    #[test]
    fn test_update_through_layout_differ() {
        let forms = vec![square_form(), to_form(markup(20, 10, "a"))];
        let before = collage(100, 50, forms.clone());
        let after = collage(100, 50, forms);

        let mut backend = MemoryBackend::new();
        let node = tapestry_layout::render(&mut backend.host(), &before);
        backend.tree.reset_stats();
        let updated = tapestry_layout::update(&mut backend.host(), node, &before, &after);

        assert_eq!(updated, node);
        assert_eq!(backend.tree.stats().created_total(), 0);
        assert!(backend.tree.stats().removed.is_empty());
    }

    #[test]
    fn test_fewer_forms_prune_trailing_children_in_order() {
        let mut backend = MemoryBackend::new();
        let (node, previous) = draw(
            &mut backend,
            vec![
                square_form(),
                to_form(spacer(1, 1)),
                square_form(),
                to_form(spacer(2, 2)),
                square_form(),
            ],
        );
        let before = backend.tree.children(node);
        assert_eq!(before.len(), 5);

        redraw_with(
            &mut backend,
            node,
            &previous,
            vec![square_form(), to_form(spacer(1, 1))],
        );
        assert_eq!(backend.tree.children(node), before[..2].to_vec());
        assert_eq!(backend.tree.stats().removed, before[2..].to_vec());
        assert_eq!(backend.tree.stats().created_total(), 0);
    }

    #[test]
    fn test_embedded_element_is_patched_in_its_wrapper() {
        let mut backend = MemoryBackend::new();
        let (node, previous) = draw(&mut backend, vec![to_form(markup(20, 10, "a"))]);
        let wrapper = backend.tree.first_child(node).unwrap();
        let inner = backend.tree.first_child(wrapper).unwrap();

        redraw_with(
            &mut backend,
            node,
            &previous,
            vec![to_form(markup(20, 10, "b")).move_by(5.0, 7.0)],
        );
        assert_eq!(backend.tree.children(node), vec![wrapper]);
        assert_eq!(backend.tree.first_child(wrapper), Some(inner));
        assert_eq!(backend.tree.markup(inner).as_deref(), Some("b"));

        let Some(StyleValue::Transform(transform)) =
            backend.tree.style(wrapper, StyleProp::Transform)
        else {
            panic!("wrapper has no transform");
        };
        // centered in 100x50, moved right 5 and up 7
        assert_eq!(transform.transform_point(Point::ZERO), Point::new(45.0, 13.0));
        assert_eq!(
            backend.tree.style(wrapper, StyleProp::Width),
            Some(StyleValue::Px(20.0))
        );
    }

    #[test]
    fn test_element_between_leaves_splits_surfaces() {
        let mut backend = MemoryBackend::new();
        let (node, previous) = draw(&mut backend, vec![square_form(), square_form()]);
        assert_eq!(kinds(&backend.tree, node), vec![NodeKind::Surface]);

        redraw_with(
            &mut backend,
            node,
            &previous,
            vec![square_form(), to_form(spacer(1, 1)), square_form()],
        );
        assert_eq!(
            kinds(&backend.tree, node),
            vec![NodeKind::Surface, NodeKind::Wrapper, NodeKind::Surface]
        );
        assert_eq!(backend.tree.stats().created(NodeKind::Surface), 1);
        assert_eq!(backend.tree.stats().created(NodeKind::Wrapper), 1);
    }

    #[test]
    fn test_dashes_fall_back_to_tracer() {
        let line = traced(dashed(Color::BLACK), segment((0.0, 0.0), (20.0, 0.0)));

        let mut backend = MemoryBackend::new();
        let (node, _) = draw(&mut backend, vec![line.clone()]);
        let child = backend.tree.first_child(node).unwrap();
        let commands = surface(&backend.tree, child).commands();
        assert!(!commands.iter().any(|c| matches!(c, SurfaceCommand::LineDash { .. })));
        // 8 on, 4 skip, 8 on
        let moves = commands.iter().filter(|c| matches!(c, SurfaceCommand::MoveTo(_))).count();
        let lines = commands.iter().filter(|c| matches!(c, SurfaceCommand::LineTo(_))).count();
        assert_eq!((moves, lines), (2, 2));

        let mut backend = MemoryBackend::new().with_tree(RetainedTree::new().with_native_dash(true));
        let (node, _) = draw(&mut backend, vec![line.clone()]);
        let child = backend.tree.first_child(node).unwrap();
        assert!(surface(&backend.tree, child).commands().contains(&SurfaceCommand::LineDash {
            pattern: vec![8.0, 4.0],
            offset: 0.0
        }));

        let mut backend = MemoryBackend::with_config(EngineConfig::new().with_native_line_dash(false))
            .with_tree(RetainedTree::new().with_native_dash(true));
        let (node, _) = draw(&mut backend, vec![line]);
        let child = backend.tree.first_child(node).unwrap();
        assert!(!surface(&backend.tree, child)
            .commands()
            .iter()
            .any(|c| matches!(c, SurfaceCommand::LineDash { .. })));
    }

    #[test]
    fn test_device_pixel_ratio_scales_surfaces() {
        let mut backend = MemoryBackend::with_config(EngineConfig::new().with_device_pixel_ratio(2.0));
        let (node, _) = draw(&mut backend, vec![square_form()]);
        let child = backend.tree.first_child(node).unwrap();
        let s = surface(&backend.tree, child);
        assert_eq!(s.size(), Size::new(200.0, 100.0));
        assert_eq!(
            s.commands()[0],
            SurfaceCommand::SetTransform(Affine2D::collage_to_device(100.0, 50.0, 2.0))
        );
        assert_eq!(
            backend.tree.style(child, StyleProp::Width),
            Some(StyleValue::Px(100.0))
        );
    }

    #[test]
    fn test_text_is_centered() {
        let mut backend = MemoryBackend::new();
        let (node, _) = draw(&mut backend, vec![text(Text::new("hi"))]);
        let child = backend.tree.first_child(node).unwrap();
        let commands = surface(&backend.tree, child).commands();
        assert!(commands.contains(&SurfaceCommand::Font("12px sans-serif".into())));
        let origin = commands.iter().find_map(|c| match c {
            SurfaceCommand::FillText { origin, .. } => Some(*origin),
            _ => None,
        });
        assert_eq!(origin, Some(Point::new(-6.0, 6.0)));
    }

    #[test]
    fn test_degenerate_points_draw_nothing() {
        let mut backend = MemoryBackend::new();
        let forms = vec![
            traced(default_line(), Path(Vec::new())),
            filled(Color::RED, polygon([(1.0, 1.0)])),
        ];
        let (node, _) = draw(&mut backend, forms);
        let child = backend.tree.first_child(node).unwrap();
        assert!(surface(&backend.tree, child).draw_alphas().is_empty());
    }

    #[test]
    fn test_loaded_image_is_drawn_after_redraw() {
        let mut backend = MemoryBackend::new();
        let (node, _) = draw(&mut backend, vec![sprite(10.0, 8.0, (2.0, 3.0), "pic.png")]);
        let child = backend.tree.first_child(node).unwrap();
        assert_eq!(backend.assets.pending("pic.png"), 1);
        assert!(surface(&backend.tree, child).draw_alphas().is_empty());

        let callbacks = backend.assets.resolve("pic.png", ImageInfo::new(64.0, 64.0));
        for callback in callbacks {
            callback(&mut backend.host());
        }

        let image = surface(&backend.tree, child).commands().iter().find_map(|c| match c {
            SurfaceCommand::DrawImage { source, dest, .. } => Some((*source, *dest)),
            _ => None,
        });
        assert_eq!(
            image,
            Some((Rect::new(2.0, 3.0, 10.0, 8.0), Rect::new(-5.0, -4.0, 10.0, 8.0)))
        );
    }

    #[test]
    fn test_superseded_redraw_is_skipped() {
        let mut backend = MemoryBackend::new();
        let (node, loading) = draw(&mut backend, vec![sprite(10.0, 8.0, (0.0, 0.0), "slow.png")]);
        assert_eq!(backend.assets.pending("slow.png"), 1);

        redraw_with(&mut backend, node, &loading, vec![to_form(markup(20, 10, "newer"))]);
        let settled = backend.tree.snapshot(node);
        backend.tree.reset_stats();

        let callbacks = backend.assets.resolve("slow.png", ImageInfo::new(64.0, 64.0));
        assert_eq!(callbacks.len(), 1);
        for callback in callbacks {
            callback(&mut backend.host());
        }

        assert_eq!(backend.tree.snapshot(node), settled);
        assert_eq!(backend.tree.stats().created_total(), 0);
        assert!(backend.tree.stats().removed.is_empty());
    }

    /// Loader whose assets never finish
    #[derive(Default)]
    struct NeverReady {
        callbacks: Vec<AssetCallback>,
    }

    impl AssetLoader for NeverReady {
        fn image(&mut self, _src: &str) -> AssetState {
            AssetState::Loading
        }

        fn on_ready(&mut self, _src: &str, callback: AssetCallback) {
            self.callbacks.push(callback);
        }
    }

    #[test]
    fn test_redraw_cannot_rearm() {
        let mut tree = RetainedTree::new();
        let measure = StyleMeasure;
        let mut loader = NeverReady::default();
        let config = EngineConfig::new();

        let collage = Collage::new(
            50.0,
            50.0,
            vec![
                sprite(4.0, 4.0, (0.0, 0.0), "a.png"),
                sprite(4.0, 4.0, (0.0, 0.0), "a.png"),
                textured("b.png", square(3.0)),
            ],
        );
        let node = collage.render(&mut Host::new(&mut tree, &measure, &mut loader, &config));
        // one redraw per loading source
        assert_eq!(loader.callbacks.len(), 2);

        let callback = loader.callbacks.remove(0);
        loader.callbacks.clear();
        callback(&mut Host::new(&mut tree, &measure, &mut loader, &config));
        assert!(loader.callbacks.is_empty());
        assert_eq!(kinds(&tree, node), vec![NodeKind::Surface]);
    }

    #[test]
    fn test_retrigger_can_be_disabled() {
        let mut backend =
            MemoryBackend::with_config(EngineConfig::new().with_retrigger_assets(false));
        draw(&mut backend, vec![sprite(4.0, 4.0, (0.0, 0.0), "a.png")]);
        assert_eq!(backend.assets.pending("a.png"), 0);
    }

    #[test]
    fn test_corrupt_wrapper_redraws_from_scratch() {
        init_tracing();
        let forms = vec![square_form(), to_form(spacer(3, 3))];
        let mut backend = MemoryBackend::new();
        let (node, previous) = draw(&mut backend, forms.clone());
        let wrapper = backend.tree.children(node)[1];
        let inner = backend.tree.first_child(wrapper).unwrap();
        backend.tree.remove_child(wrapper, inner).unwrap();

        redraw_with(&mut backend, node, &previous, forms);
        assert_eq!(
            kinds(&backend.tree, node),
            vec![NodeKind::Surface, NodeKind::Wrapper]
        );
        let wrapper = backend.tree.children(node)[1];
        assert!(backend.tree.first_child(wrapper).is_some());
    }
}
