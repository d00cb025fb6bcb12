//! Pinwheel Runtime - Tick scheduling infrastructure
//!
//! Provides the building blocks hosts use to drive animations:
//! - `TimerQueue`: self-rescheduling message timers with cancellable handles
//! - `FrameClock`: fixed-timestep accumulator for frame-driven hosts
//! - `Animated`: trait for anything advanced by the host loop

mod clock;
mod system;
mod timer;

pub use clock::FrameClock;
pub use system::Animated;
pub use timer::{TimerHandle, TimerQueue};
