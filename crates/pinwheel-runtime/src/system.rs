//! Animated trait

use std::time::Duration;

/// Something the host loop advances in real time
///
/// Hosts call `advance` once per frame (or per fixed step) with the real time
/// elapsed since the previous call.
pub trait Animated {
    /// Advance internal timers and simulation by `dt` of real time
    fn advance(&mut self, dt: Duration);

    /// True when no timers are pending and nothing is on screen
    fn is_idle(&self) -> bool;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}
