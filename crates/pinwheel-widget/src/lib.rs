//! Pinwheel Widget - progress arc with a spinning pinwheel and particle burst
//!
//! Provides the host-facing widget built on the particle engine:
//! - `CircleProgressBar` for the arc geometry and drawing
//! - `Tween` for the frame-driven value animations
//! - `PinWheelWidget` for the start/stop choreography
//! - `WidgetSurface` as the container the particle field is mounted in

mod progress;
mod surface;
mod tween;
mod widget;

pub use progress::CircleProgressBar;
pub use surface::WidgetSurface;
pub use tween::{Tween, TweenEvent};
pub use widget::{
    PinWheelWidget, MAX_PROGRESS, PROGRESS_DURATION, START_DEGREE, TOTAL_DEGREE, UNIFORM_DEGREE,
};
