//! Pinwheel Particles - pooled sprite particle engine
//!
//! Provides a fixed-size particle arena driven by a virtual-time tick loop:
//! - Rate-limited activation from a point or rectangular emission region
//! - Per-particle modifiers (alpha fade, half-sine scale) and initializers
//!   (speed and acceleration ranges)
//! - Continuous, one-shot and stop-then-drain lifecycles
//! - A `ParticleField` handle the host draws through from its render thread

pub mod curves;
pub mod emitter;
pub mod field;
pub mod host;
pub mod initializer;
pub mod modifier;
pub mod particle;
pub mod rand;
pub mod system;

pub use curves::Easing;
pub use emitter::{EmissionRegion, EmitterAnchor, ModifierConfig, ModifierKind, ParticleConfig};
pub use field::ParticleField;
pub use host::{EmitterBounds, SurfaceHost};
pub use initializer::{AccelerationInitializer, ParticleInitializer, SpeedRangeInitializer};
pub use modifier::{AlphaModifier, ModifierList, ParticleModifier, ScaleModifier};
pub use particle::{Particle, ParticlePool};
pub use rand::ParticleRng;
pub use system::{EngineMessage, EngineState, ParticleSystem};
