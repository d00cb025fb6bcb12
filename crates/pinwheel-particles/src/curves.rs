//! Easing curves mapping normalized time to a progress factor

use std::f32::consts::PI;

/// Time-to-progress curve used by modifiers and widget tweens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// `sin(π·t)`: rises to 1 at the midpoint and falls back to 0
    HalfSine,
    /// Slow start and end, `cos((t + 1)·π) / 2 + 0.5`
    AccelerateDecelerate,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::HalfSine => (PI * t).sin(),
            Easing::AccelerateDecelerate => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
        }
    }

    /// Parse a config name (`linear`, `half_sine`, `accelerate_decelerate`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(Easing::Linear),
            "half_sine" | "sin" => Some(Easing::HalfSine),
            "accelerate_decelerate" => Some(Easing::AccelerateDecelerate),
            _ => None,
        }
    }

    pub const NAMES: [&'static str; 3] = ["linear", "half_sine", "accelerate_decelerate"];
}
