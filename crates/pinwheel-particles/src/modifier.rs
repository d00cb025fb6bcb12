//! Per-tick particle modifiers
//!
//! A modifier is a stateless policy: everything it remembers between ticks is
//! written into the particle's scratch fields on the first call (elapsed 0).

use crate::curves::Easing;
use crate::particle::Particle;
use crate::rand::ParticleRng;
use std::sync::Arc;

/// Mutates one visual property of a particle as time goes by
pub trait ParticleModifier: Send + Sync {
    /// Apply at `elapsed_ms` since activation. Returning false stops the particle.
    fn apply(&self, particle: &mut Particle, elapsed_ms: u64, rng: &mut ParticleRng) -> bool;
}

/// Immutable list shared by every particle activated from the same snapshot
pub type ModifierList = Arc<[Arc<dyn ParticleModifier>]>;

pub fn empty_modifiers() -> ModifierList {
    Arc::from(Vec::<Arc<dyn ParticleModifier>>::new())
}

/// Copy-on-write append: particles holding the old list keep it unchanged
pub fn with_modifier(list: &ModifierList, modifier: Arc<dyn ParticleModifier>) -> ModifierList {
    let mut items: Vec<Arc<dyn ParticleModifier>> = list.iter().cloned().collect();
    items.push(modifier);
    Arc::from(items)
}

fn window_progress(elapsed_ms: u64, start_ms: u64, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed_ms - start_ms) as f32 / duration
}

/// Fades alpha between random start and end values over `[start_ms, end_ms)`.
///
/// On the first call a start alpha is drawn from `[0, |initial|)` and a target
/// from `[0, |final|)`. The stored starting point is the negated draw, so the
/// fade begins below zero. At `end_ms` the particle snaps to its target,
/// collapses to scale 0 and stops.
#[derive(Debug, Clone)]
pub struct AlphaModifier {
    initial: i32,
    final_value: i32,
    start_ms: u64,
    end_ms: u64,
    duration: f32,
    easing: Easing,
}

impl AlphaModifier {
    pub fn new(initial: i32, final_value: i32, start_ms: u64, end_ms: u64) -> Self {
        Self::with_easing(initial, final_value, start_ms, end_ms, Easing::Linear)
    }

    pub fn with_easing(
        initial: i32,
        final_value: i32,
        start_ms: u64,
        end_ms: u64,
        easing: Easing,
    ) -> Self {
        Self {
            initial,
            final_value,
            start_ms,
            end_ms,
            duration: end_ms.saturating_sub(start_ms) as f32,
            easing,
        }
    }
}

impl ParticleModifier for AlphaModifier {
    fn apply(&self, p: &mut Particle, elapsed_ms: u64, rng: &mut ParticleRng) -> bool {
        if elapsed_ms == 0 {
            let start = rng.below(self.initial.unsigned_abs()) as i32;
            p.alpha = start;
            p.alpha_initial = -start;

            p.alpha_final = rng.below(self.final_value.unsigned_abs()) as i32;
            p.alpha_increment = p.alpha_final - p.alpha_initial;
        } else if elapsed_ms < self.start_ms {
            p.alpha = self.initial;
        } else if elapsed_ms >= self.end_ms {
            p.alpha = p.alpha_final;
            p.scale = 0.0;
            return false;
        } else {
            let t = self
                .easing
                .apply(window_progress(elapsed_ms, self.start_ms, self.duration));
            p.alpha = (p.alpha_initial as f32 + p.alpha_increment as f32 * t) as i32;
        }
        true
    }
}

/// Scales the particle over `[start_ms, end_ms]`, half-sine by default so the
/// particle grows and then shrinks back to nothing.
///
/// The first call picks the peak scale: a draw from `[0, 2/3)` selects
/// `initial` when below it, `final` when above it, and otherwise leaves the
/// slot's previous peak in place.
#[derive(Debug, Clone)]
pub struct ScaleModifier {
    initial: f32,
    final_value: f32,
    start_ms: u64,
    end_ms: u64,
    duration: f32,
    easing: Easing,
}

impl ScaleModifier {
    pub fn new(initial: f32, final_value: f32, start_ms: u64, end_ms: u64) -> Self {
        Self::with_easing(initial, final_value, start_ms, end_ms, Easing::HalfSine)
    }

    pub fn with_easing(
        initial: f32,
        final_value: f32,
        start_ms: u64,
        end_ms: u64,
        easing: Easing,
    ) -> Self {
        Self {
            initial,
            final_value,
            start_ms,
            end_ms,
            duration: end_ms.saturating_sub(start_ms) as f32,
            easing,
        }
    }
}

impl ParticleModifier for ScaleModifier {
    fn apply(&self, p: &mut Particle, elapsed_ms: u64, rng: &mut ParticleRng) -> bool {
        if elapsed_ms == 0 {
            let pick = rng.next_f32() / 1.5;
            if pick < self.initial {
                p.scale_initial = self.initial;
            }
            if pick > self.final_value {
                p.scale_initial = self.final_value;
            }
            p.scale = p.scale_initial;
        } else if elapsed_ms < self.start_ms {
            p.scale = self.initial;
        } else if elapsed_ms > self.end_ms {
            p.scale = 0.0;
            return false;
        } else {
            let t = window_progress(elapsed_ms, self.start_ms, self.duration);
            p.scale = p.scale_initial * self.easing.apply(t);
        }
        true
    }
}
