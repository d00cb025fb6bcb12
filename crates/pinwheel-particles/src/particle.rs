//! Particle state and the fixed-size particle arena

use crate::modifier::{empty_modifiers, ModifierList};
use crate::rand::ParticleRng;
use glam::{Affine2, Vec2};
use pinwheel_core::{Canvas, Paint, Sprite};
use std::collections::VecDeque;
use std::sync::Arc;

/// One poolable sprite particle.
///
/// Times are virtual milliseconds. `position` is the top-left corner of the
/// sprite; the sprite is scaled about its own center.
#[derive(Clone)]
pub struct Particle {
    /// Half width/height of the shared sprite
    pub half_extents: Vec2,

    pub position: Vec2,
    pub initial_position: Vec2,
    /// Pixels per millisecond
    pub speed: Vec2,
    /// Pixels per millisecond squared
    pub acceleration: Vec2,

    pub scale: f32,
    pub alpha: i32,

    // Scratch written by modifiers on their first invocation
    pub alpha_initial: i32,
    pub alpha_final: i32,
    pub alpha_increment: i32,
    pub scale_initial: f32,

    pub time_to_live: u64,
    pub start_ms: u64,
    running: bool,
    modifiers: ModifierList,
}

impl Particle {
    pub fn new(half_extents: Vec2) -> Self {
        Self {
            half_extents,
            position: Vec2::ZERO,
            initial_position: Vec2::ZERO,
            speed: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            scale: 1.0,
            alpha: 255,
            alpha_initial: 0,
            alpha_final: 0,
            alpha_increment: 0,
            scale_initial: 0.0,
            time_to_live: 0,
            start_ms: 0,
            running: false,
            modifiers: empty_modifiers(),
        }
    }

    /// Restore default visuals before initializers run
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.alpha = 255;
    }

    /// Place the sprite centered on the emitter point and mark it running
    pub fn configure(&mut self, time_to_live: u64, emitter_x: f32, emitter_y: f32) {
        self.initial_position = Vec2::new(emitter_x, emitter_y) - self.half_extents;
        self.position = self.initial_position;
        self.time_to_live = time_to_live;
        self.running = true;
    }

    /// Start the particle's clock and attach the shared modifier list
    pub fn activate(&mut self, start_ms: u64, modifiers: ModifierList) {
        self.start_ms = start_ms;
        self.modifiers = modifiers;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Deactivate without waiting for expiry
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance to `now_ms`. Returns false once the particle has expired or a
    /// modifier stopped it; the caller must recycle it then.
    pub fn update(&mut self, now_ms: u64, rng: &mut ParticleRng) -> bool {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        if elapsed > self.time_to_live || !self.running {
            return false;
        }

        let t = elapsed as f32;
        self.position = self.initial_position + self.speed * t + 0.5 * self.acceleration * t * t;

        // Every modifier runs, even after one has asked to stop
        let modifiers = Arc::clone(&self.modifiers);
        for modifier in modifiers.iter() {
            if !modifier.apply(self, elapsed, rng) {
                self.running = false;
            }
        }
        self.running
    }

    /// Sprite-to-canvas transform: scale about the sprite center, then move to `position`
    pub fn transform(&self) -> Affine2 {
        Affine2::from_translation(self.position + self.half_extents)
            * Affine2::from_scale(Vec2::splat(self.scale))
            * Affine2::from_translation(-self.half_extents)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, sprite: &Sprite) {
        if !self.running {
            return;
        }
        // Only the low byte reaches the paint, so negative alphas wrap
        let paint = Paint::with_alpha(self.alpha as u8);
        canvas.draw_image(sprite, self.transform(), &paint);
    }
}

/// Fixed arena of particles with explicit free and active index sets.
///
/// Slots are allocated once. A slot index lives in exactly one of `free`
/// (FIFO) or `active`.
pub struct ParticlePool {
    particles: Vec<Particle>,
    free: VecDeque<usize>,
    active: Vec<usize>,
    sprite: Option<Arc<Sprite>>,
}

impl ParticlePool {
    /// Without a sprite the pool is empty and the engine stays inert.
    pub fn new(sprite: Option<Arc<Sprite>>, capacity: usize) -> Self {
        let (particles, free) = match &sprite {
            Some(s) => {
                let half = s.half_extents();
                (vec![Particle::new(half); capacity], (0..capacity).collect())
            }
            None => (Vec::new(), VecDeque::new()),
        };
        Self {
            particles,
            free,
            active: Vec::with_capacity(capacity),
            sprite,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn sprite(&self) -> Option<&Arc<Sprite>> {
        self.sprite.as_ref()
    }

    /// Drop the shared sprite. Returns false if it was already released.
    pub fn release_sprite(&mut self) -> bool {
        self.sprite.take().is_some()
    }

    /// Move the oldest free slot to the active set and hand it out for setup.
    /// Returns None when the pool is exhausted or the sprite was released.
    pub fn spawn(&mut self) -> Option<&mut Particle> {
        self.sprite.as_ref()?;
        let idx = self.free.pop_front()?;
        self.active.push(idx);
        Some(&mut self.particles[idx])
    }

    /// Update every active particle and return the expired ones to the pool.
    /// Returns how many were recycled.
    pub fn update_and_recycle(&mut self, now_ms: u64, rng: &mut ParticleRng) -> usize {
        let particles = &mut self.particles;
        let free = &mut self.free;
        let before = self.active.len();
        self.active.retain(|&idx| {
            let alive = particles[idx].update(now_ms, rng);
            if !alive {
                free.push_back(idx);
            }
            alive
        });
        before - self.active.len()
    }

    /// Return every active particle to the pool
    pub fn drain_active(&mut self) {
        for idx in self.active.drain(..) {
            self.particles[idx].stop();
            self.free.push_back(idx);
        }
    }

    pub fn active_particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.active.iter().map(|&idx| &self.particles[idx])
    }

    pub fn particle(&self, idx: usize) -> Option<&Particle> {
        self.particles.get(idx)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let Some(sprite) = &self.sprite else {
            return;
        };
        for p in self.active_particles() {
            p.draw(canvas, sprite);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{AlphaModifier, ParticleModifier};
    use pinwheel_core::{Color, DrawCommand, RecordingCanvas};

    fn sprite() -> Arc<Sprite> {
        Arc::new(Sprite::solid(10, 6, Color::WHITE))
    }

    fn no_modifiers() -> ModifierList {
        empty_modifiers()
    }

    #[test]
    fn configure_centers_sprite_on_emitter() {
        let mut p = Particle::new(Vec2::new(5.0, 3.0));
        p.configure(100, 50.0, 40.0);
        assert_eq!(p.initial_position, Vec2::new(45.0, 37.0));
        assert_eq!(p.position, p.initial_position);
        assert!(p.is_running());
    }

    #[test]
    fn kinematics_follow_half_at_squared() {
        let mut rng = ParticleRng::new(1);
        let mut p = Particle::new(Vec2::ZERO);
        p.speed = Vec2::new(0.1, -0.2);
        p.acceleration = Vec2::new(0.002, 0.0);
        p.configure(1000, 0.0, 0.0);
        p.activate(100, no_modifiers());

        assert!(p.update(200, &mut rng));
        // t = 100: 0.1*100 + 0.5*0.002*100^2 = 10 + 10
        assert!((p.position.x - 20.0).abs() < 1e-4);
        assert!((p.position.y + 20.0).abs() < 1e-4);
    }

    #[test]
    fn update_false_after_time_to_live() {
        let mut rng = ParticleRng::new(1);
        let mut p = Particle::new(Vec2::ZERO);
        p.configure(50, 0.0, 0.0);
        p.activate(0, no_modifiers());
        assert!(p.update(50, &mut rng));
        assert!(!p.update(51, &mut rng));
    }

    #[test]
    fn any_modifier_stop_wins() {
        struct Stop;
        impl ParticleModifier for Stop {
            fn apply(&self, _: &mut Particle, _: u64, _: &mut ParticleRng) -> bool {
                false
            }
        }
        let list: ModifierList = vec![
            Arc::new(AlphaModifier::new(100, 100, 0, 1000)) as Arc<dyn ParticleModifier>,
            Arc::new(Stop) as Arc<dyn ParticleModifier>,
        ]
        .into();

        let mut rng = ParticleRng::new(3);
        let mut p = Particle::new(Vec2::ZERO);
        p.configure(1000, 0.0, 0.0);
        p.activate(0, list);
        assert!(!p.update(10, &mut rng));
        assert!(!p.is_running());
        // Stays dead until reconfigured
        assert!(!p.update(20, &mut rng));
        p.configure(1000, 0.0, 0.0);
        assert!(p.is_running());
    }

    #[test]
    fn draw_scales_about_center_and_wraps_alpha() {
        let sprite = sprite();
        let mut p = Particle::new(sprite.half_extents());
        p.configure(100, 20.0, 20.0);
        p.scale = 0.5;
        p.alpha = -40;

        let mut canvas = RecordingCanvas::new();
        p.draw(&mut canvas, &sprite);
        let DrawCommand::Image { transform, alpha, .. } = &canvas.commands[0] else {
            panic!("expected image draw");
        };
        assert_eq!(*alpha, 216);
        // Sprite center stays on the emitter point
        let center = transform.transform_point2(Vec2::new(5.0, 3.0));
        assert!((center - Vec2::new(20.0, 20.0)).length() < 1e-4);
        let corner = transform.transform_point2(Vec2::ZERO);
        assert!((corner - Vec2::new(17.5, 18.5)).length() < 1e-4);
    }

    #[test]
    fn fading_in_particle_stays_visible() {
        let sprite = sprite();
        let list: ModifierList =
            vec![Arc::new(AlphaModifier::new(-250, 250, 0, 2000)) as Arc<dyn ParticleModifier>]
                .into();

        let mut rng = ParticleRng::new(7);
        let mut p = Particle::new(sprite.half_extents());
        p.configure(6000, 20.0, 20.0);
        p.activate(0, list);
        assert!(p.update(0, &mut rng));
        assert_eq!(p.alpha_initial, -p.alpha);
        // Pin the fade so it starts well below zero
        p.alpha_initial = -120;
        p.alpha_final = 200;
        p.alpha_increment = 320;
        assert!(p.update(10, &mut rng));
        assert_eq!(p.alpha, -118);

        let mut canvas = RecordingCanvas::new();
        p.draw(&mut canvas, &sprite);
        let DrawCommand::Image { alpha, .. } = &canvas.commands[0] else {
            panic!("expected image draw");
        };
        assert_eq!(*alpha, 138);
    }

    #[test]
    fn stopped_particle_is_not_drawn() {
        let sprite = sprite();
        let mut p = Particle::new(sprite.half_extents());
        p.configure(100, 0.0, 0.0);
        p.stop();
        let mut canvas = RecordingCanvas::new();
        p.draw(&mut canvas, &sprite);
        assert!(canvas.commands.is_empty());
    }

    #[test]
    fn pool_spawn_recycle_keeps_counts() {
        let mut rng = ParticleRng::new(5);
        let mut pool = ParticlePool::new(Some(sprite()), 4);
        assert_eq!(pool.capacity(), 4);

        for ttl in [10, 100, 100] {
            let p = pool.spawn().unwrap();
            p.configure(ttl, 0.0, 0.0);
            p.activate(0, no_modifiers());
        }
        assert_eq!(pool.active_count() + pool.free_count(), 4);
        assert_eq!(pool.active_count(), 3);

        assert_eq!(pool.update_and_recycle(50, &mut rng), 1);
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.free_count(), 2);

        pool.spawn().unwrap();
        pool.spawn().unwrap();
        assert!(pool.spawn().is_none());
        assert_eq!(pool.active_count() + pool.free_count(), 4);

        pool.drain_active();
        assert_eq!(pool.free_count(), 4);
        assert_eq!(pool.active_particles().count(), 0);
        assert!((0..4).all(|i| !pool.particle(i).unwrap().is_running()));
    }

    #[test]
    fn free_slots_are_reused_fifo() {
        let mut rng = ParticleRng::new(5);
        let mut pool = ParticlePool::new(Some(sprite()), 2);
        let p = pool.spawn().unwrap();
        p.configure(0, 0.0, 0.0);
        p.activate(0, no_modifiers());
        pool.update_and_recycle(1, &mut rng);

        // Slot 1 was never used, so it comes out before the recycled slot 0
        pool.spawn().unwrap().alpha = 7;
        assert_eq!(pool.particle(1).unwrap().alpha, 7);
    }

    #[test]
    fn pool_without_sprite_is_inert() {
        let mut pool = ParticlePool::new(None, 30);
        assert_eq!(pool.capacity(), 0);
        assert!(pool.spawn().is_none());
    }

    #[test]
    fn released_sprite_blocks_spawn() {
        let mut pool = ParticlePool::new(Some(sprite()), 3);
        assert!(pool.release_sprite());
        assert!(!pool.release_sprite());
        assert!(pool.spawn().is_none());
        assert_eq!(pool.free_count(), 3);
    }
}
