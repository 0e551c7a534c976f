//! Collages as layout elements

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use tapestry_core::{Host, NodeId};
use tapestry_layout::element::embedded;
use tapestry_layout::{LayoutElement, Renderable};

use crate::form::Form;
use crate::renderer;

/// A fixed-size drawing area holding a list of forms
#[derive(Clone, Debug)]
pub struct Collage {
    width: f32,
    height: f32,
    forms: Rc<[Form]>,
    /// Bumped when a newer collage takes over the container this one drew
    generation: Rc<Cell<u64>>,
}

impl Collage {
    pub fn new(width: f32, height: f32, forms: Vec<Form>) -> Self {
        Self {
            width,
            height,
            forms: forms.into(),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Invalidate redraws armed by passes that drew this collage
    pub(crate) fn supersede(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }
}

impl Renderable for Collage {
    fn render(&self, host: &mut Host<'_>) -> NodeId {
        renderer::render(host, self)
    }

    fn update(&self, host: &mut Host<'_>, node: NodeId, previous: &dyn Renderable) -> NodeId {
        match previous.as_any().downcast_ref::<Collage>() {
            Some(previous) => {
                previous.supersede();
                renderer::update(host, self, node, previous.forms(), true);
                node
            }
            None => self.render(host),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A `width` x `height` layout element drawing `forms`
pub fn collage(width: u32, height: u32, forms: Vec<Form>) -> LayoutElement {
    embedded(
        width,
        height,
        Collage::new(width as f32, height as f32, forms),
    )
}
