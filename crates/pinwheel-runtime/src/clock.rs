//! Frame clock with fixed-timestep accumulator

use std::time::{Duration, Instant};

/// Tracks host frame time and hands out fixed animation steps
pub struct FrameClock {
    /// Total elapsed time
    pub total_time: Duration,
    /// Time since last frame
    pub delta_time: Duration,
    /// Fixed step handed to animations (default: 16 ms)
    pub fixed_step: Duration,
    /// Accumulated time not yet consumed as fixed steps
    accumulator: Duration,
    last_instant: Instant,
    first_tick: bool,
}

/// Frames longer than this are clamped
const MAX_FRAME: Duration = Duration::from_millis(250);

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: Duration::ZERO,
            delta_time: Duration::ZERO,
            fixed_step: Duration::from_millis(16),
            accumulator: Duration::ZERO,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock handing out steps of `step`
    pub fn with_fixed_step(step: Duration) -> Self {
        Self {
            fixed_step: step,
            ..Self::default()
        }
    }

    /// Advance from the wall clock. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = Duration::ZERO;
            return;
        }

        let elapsed = now.duration_since(self.last_instant);
        self.last_instant = now;
        self.tick_by(elapsed);
    }

    /// Advance by an explicit amount (headless hosts)
    pub fn tick_by(&mut self, elapsed: Duration) {
        self.first_tick = false;
        self.delta_time = elapsed.min(MAX_FRAME);
        self.total_time += self.delta_time;
        self.accumulator += self.delta_time;
    }

    /// Returns true if there's enough accumulated time for a fixed step
    pub fn should_step(&self) -> bool {
        self.accumulator >= self.fixed_step
    }

    /// Consume one fixed step from the accumulator
    pub fn consume_step(&mut self) -> Duration {
        self.accumulator -= self.fixed_step;
        self.fixed_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert_eq!(clock.fixed_step, Duration::from_millis(16));
        assert_eq!(clock.total_time, Duration::ZERO);
    }

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = FrameClock::new();
        clock.tick();
        assert_eq!(clock.delta_time, Duration::ZERO);
    }

    #[test]
    fn test_accumulator_logic() {
        let mut clock = FrameClock::with_fixed_step(Duration::from_millis(10));
        clock.tick_by(Duration::from_millis(25));

        assert!(clock.should_step());
        clock.consume_step();
        assert!(clock.should_step());
        clock.consume_step();
        assert!(!clock.should_step());
        assert_eq!(clock.total_time, Duration::from_millis(25));
    }

    #[test]
    fn test_long_frames_clamped() {
        let mut clock = FrameClock::new();
        clock.tick_by(Duration::from_secs(3));
        assert_eq!(clock.delta_time, MAX_FRAME);
    }
}
