//! One-time particle setup run at activation

use crate::particle::Particle;
use crate::rand::ParticleRng;

/// Sets per-particle ranges once, before the particle is positioned
pub trait ParticleInitializer: Send + Sync {
    fn init(&self, particle: &mut Particle, rng: &mut ParticleRng);
}

/// Uniform random speed, drawn independently per axis (pixels per ms)
#[derive(Debug, Clone, Copy)]
pub struct SpeedRangeInitializer {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl SpeedRangeInitializer {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

impl ParticleInitializer for SpeedRangeInitializer {
    fn init(&self, p: &mut Particle, rng: &mut ParticleRng) {
        p.speed.x = rng.range(self.min_x, self.max_x);
        p.speed.y = rng.range(self.min_y, self.max_y);
    }
}

/// Uniform random acceleration, drawn independently per axis (pixels per ms²)
#[derive(Debug, Clone, Copy)]
pub struct AccelerationInitializer {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl AccelerationInitializer {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

impl ParticleInitializer for AccelerationInitializer {
    fn init(&self, p: &mut Particle, rng: &mut ParticleRng) {
        p.acceleration.x = rng.range(self.min_x, self.max_x);
        p.acceleration.y = rng.range(self.min_y, self.max_y);
    }
}
