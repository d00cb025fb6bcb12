//! Host-side collaborators the engine is mounted into

use crate::field::ParticleField;
use pinwheel_core::Rect;

/// Anything with an on-screen rectangle particles can be emitted from
pub trait EmitterBounds {
    /// Bounds in window pixels
    fn bounds_in_window(&self) -> Rect;
}

/// The container the particle field is drawn in.
///
/// The engine mounts a `ParticleField` on `emit()`/`one_shot()` and unmounts
/// it on cancel. Particle coordinates are relative to this container's origin.
pub trait SurfaceHost: EmitterBounds {
    fn attach(&mut self, field: ParticleField);

    fn detach(&mut self);

    /// Ask the platform to call `ParticleField::draw` again soon
    fn request_redraw(&mut self);
}

impl EmitterBounds for Rect {
    fn bounds_in_window(&self) -> Rect {
        *self
    }
}
