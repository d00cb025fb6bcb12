//! Single-value tweens advanced by the host frame loop

use pinwheel_particles::Easing;
use std::time::Duration;

/// What a call to `Tween::advance` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenEvent {
    /// Finished or cancelled earlier; nothing happened
    Idle,
    /// First frame: `value()` is still `from`
    Started,
    Updated,
    /// Last frame: `value()` is exactly `to`
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Running,
    Done,
}

/// Animates one `f32` from `from` to `to` over `duration`
#[derive(Debug, Clone)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    easing: Easing,
    elapsed: Duration,
    phase: Phase,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
            elapsed: Duration::ZERO,
            phase: Phase::Pending,
        }
    }

    /// The first advance only starts the tween; time counts from the next one.
    pub fn advance(&mut self, dt: Duration) -> TweenEvent {
        match self.phase {
            Phase::Done => TweenEvent::Idle,
            Phase::Pending => {
                self.phase = Phase::Running;
                TweenEvent::Started
            }
            Phase::Running => {
                self.elapsed += dt;
                if self.elapsed >= self.duration {
                    self.elapsed = self.duration;
                    self.phase = Phase::Done;
                    TweenEvent::Finished
                } else {
                    TweenEvent::Updated
                }
            }
        }
    }

    pub fn fraction(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.easing.apply(self.fraction())
    }

    /// Stop without reaching `to`; later advances report `Idle`
    pub fn cancel(&mut self) {
        self.phase = Phase::Done;
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}
