//! The widget's own container, handed to the particle engine as its parent

use parking_lot::Mutex;
use pinwheel_core::{Canvas, Rect};
use pinwheel_particles::{EmitterBounds, ParticleField, SurfaceHost};
use std::sync::Arc;

#[derive(Debug, Default)]
struct SurfaceState {
    bounds: Rect,
    field: Option<ParticleField>,
    redraw_requested: bool,
}

/// Shared handle: the widget keeps one clone, the engine owns another
#[derive(Debug, Clone, Default)]
pub struct WidgetSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl WidgetSurface {
    pub fn new(bounds: Rect) -> Self {
        let surface = Self::default();
        surface.set_bounds(bounds);
        surface
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.state.lock().bounds = bounds;
    }

    pub fn field(&self) -> Option<ParticleField> {
        self.state.lock().field.clone()
    }

    pub fn has_field(&self) -> bool {
        self.state.lock().field.is_some()
    }

    /// Returns and clears the pending redraw request
    pub fn take_redraw(&self) -> bool {
        std::mem::take(&mut self.state.lock().redraw_requested)
    }

    /// Draw the mounted particle field, if any
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        // Clone out so the surface lock is not held while the pool is locked
        if let Some(field) = self.field() {
            field.draw(canvas);
        }
    }
}

impl EmitterBounds for WidgetSurface {
    fn bounds_in_window(&self) -> Rect {
        self.state.lock().bounds
    }
}

impl SurfaceHost for WidgetSurface {
    fn attach(&mut self, field: ParticleField) {
        let mut state = self.state.lock();
        state.field = Some(field);
        state.redraw_requested = true;
    }

    fn detach(&mut self) {
        let mut state = self.state.lock();
        state.field = None;
        state.redraw_requested = true;
    }

    fn request_redraw(&mut self) {
        self.state.lock().redraw_requested = true;
    }
}
