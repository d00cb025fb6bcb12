//! Drawing surface for the active particles

use crate::particle::ParticlePool;
use parking_lot::Mutex;
use pinwheel_core::Canvas;
use std::sync::Arc;

/// Handle the host draws particles through.
///
/// Shares the engine's pool lock, so a draw never observes a half-updated
/// active list, and may be called from a different thread than the one ticking.
#[derive(Clone)]
pub struct ParticleField {
    pool: Arc<Mutex<ParticlePool>>,
}

impl ParticleField {
    pub(crate) fn new(pool: Arc<Mutex<ParticlePool>>) -> Self {
        Self { pool }
    }

    /// Draw every active particle
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        self.pool.lock().draw(canvas);
    }

    pub fn active_count(&self) -> usize {
        self.pool.lock().active_count()
    }

    /// Whether both handles draw the same pool
    pub fn same_pool(&self, other: &ParticleField) -> bool {
        Arc::ptr_eq(&self.pool, &other.pool)
    }
}

impl std::fmt::Debug for ParticleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleField")
            .field("active", &self.active_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::empty_modifiers;
    use pinwheel_core::{Color, RecordingCanvas, Sprite};

    #[test]
    fn draws_only_active_particles() {
        let sprite = Arc::new(Sprite::solid(4, 4, Color::WHITE));
        let pool = Arc::new(Mutex::new(ParticlePool::new(Some(sprite), 5)));
        {
            let mut guard = pool.lock();
            for _ in 0..2 {
                let p = guard.spawn().unwrap();
                p.configure(100, 10.0, 10.0);
                p.activate(0, empty_modifiers());
            }
        }
        let field = ParticleField::new(Arc::clone(&pool));
        let mut canvas = RecordingCanvas::new();
        field.draw(&mut canvas);
        assert_eq!(canvas.image_count(), 2);
        assert_eq!(field.active_count(), 2);
        assert!(field.same_pool(&field.clone()));
    }

    #[test]
    fn draw_from_another_thread() {
        let sprite = Arc::new(Sprite::solid(4, 4, Color::WHITE));
        let pool = Arc::new(Mutex::new(ParticlePool::new(Some(sprite), 1)));
        let field = ParticleField::new(Arc::clone(&pool));
        let handle = std::thread::spawn(move || {
            let mut canvas = RecordingCanvas::new();
            field.draw(&mut canvas);
            canvas.image_count()
        });
        assert_eq!(handle.join().unwrap(), 0);
    }
}
