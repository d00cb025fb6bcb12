//! Fixed-size container for running the engine without a window

use pinwheel_core::Rect;
use pinwheel_particles::{EmitterBounds, ParticleField, SurfaceHost};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct HeadlessState {
    field: Option<ParticleField>,
    redraws: u64,
}

/// Surface at a fixed window rectangle that just remembers what was mounted
#[derive(Clone)]
pub struct HeadlessSurface {
    bounds: Rect,
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessSurface {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            state: Rc::default(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.state.borrow().field.is_some()
    }

    pub fn redraws(&self) -> u64 {
        self.state.borrow().redraws
    }
}

impl EmitterBounds for HeadlessSurface {
    fn bounds_in_window(&self) -> Rect {
        self.bounds
    }
}

impl SurfaceHost for HeadlessSurface {
    fn attach(&mut self, field: ParticleField) {
        self.state.borrow_mut().field = Some(field);
    }

    fn detach(&mut self) {
        self.state.borrow_mut().field = None;
    }

    fn request_redraw(&mut self) {
        self.state.borrow_mut().redraws += 1;
    }
}
