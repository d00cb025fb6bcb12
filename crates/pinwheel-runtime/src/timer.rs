//! Virtual-time message timers
//!
//! A `TimerQueue` holds messages scheduled with a delay. The host moves time
//! forward with `advance`, then drains due messages with `pop_due`. Popping a
//! message moves the queue's clock to that message's due time, so a handler
//! that reschedules itself with a short delay gets fired again within the
//! same `advance` window. That is how a 1 ms reschedule inside a 100 ms
//! advance produces 100 ticks.

use std::time::Duration;

/// Identifies one scheduled message. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

struct Pending<M> {
    handle: TimerHandle,
    due: Duration,
    message: M,
}

/// Delayed message queue with cancellable handles
pub struct TimerQueue<M> {
    /// Time of the message being handled (or of the last advance)
    now: Duration,
    /// Everything up to here may fire
    horizon: Duration,
    next_id: u64,
    pending: Vec<Pending<M>>,
}

impl<M> Default for TimerQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> TimerQueue<M> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            horizon: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current queue time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `message` to fire `delay` after the current queue time
    pub fn schedule(&mut self, message: M, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            due: self.now + delay,
            message,
        });
        handle
    }

    /// Cancel one pending message. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    /// Drop every pending message
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::trace!("[timer] cancelling {} pending message(s)", self.pending.len());
        }
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Due time of the earliest pending message
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Let up to `dt` more time pass. Call `pop_due` afterwards.
    pub fn advance(&mut self, dt: Duration) {
        self.horizon += dt;
    }

    /// Pop the earliest message due within the advanced window.
    ///
    /// Messages with equal due times fire in scheduling order. When nothing
    /// is due, the clock catches up with the window and `None` is returned.
    pub fn pop_due(&mut self) -> Option<(TimerHandle, M)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= self.horizon)
            .min_by_key(|(_, p)| (p.due, p.handle))
            .map(|(i, _)| i);

        match idx {
            Some(i) => {
                let p = self.pending.remove(i);
                self.now = self.now.max(p.due);
                Some((p.handle, p.message))
            }
            None => {
                self.now = self.horizon;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fires_in_due_then_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule("late", 5 * MS);
        q.schedule("a", 2 * MS);
        q.schedule("b", 2 * MS);

        q.advance(10 * MS);
        let order: Vec<_> = std::iter::from_fn(|| q.pop_due().map(|(_, m)| m)).collect();
        assert_eq!(order, vec!["a", "b", "late"]);
        assert_eq!(q.now(), 10 * MS);
    }

    #[test]
    fn nothing_fires_before_due() {
        let mut q = TimerQueue::new();
        q.schedule(1, 10 * MS);
        q.advance(9 * MS);
        assert!(q.pop_due().is_none());
        q.advance(MS);
        assert_eq!(q.pop_due().map(|(_, m)| m), Some(1));
    }

    #[test]
    fn cancel_by_handle() {
        let mut q = TimerQueue::new();
        let h = q.schedule((), MS);
        assert!(q.is_pending(h));
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        q.advance(2 * MS);
        assert!(q.pop_due().is_none());
    }

    #[test]
    fn self_rescheduling_runs_within_window() {
        let mut q = TimerQueue::new();
        q.schedule((), MS);
        q.advance(100 * MS);

        let mut fired = 0;
        while q.pop_due().is_some() {
            fired += 1;
            q.schedule((), MS);
        }
        assert_eq!(fired, 100);
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_due(), Some(101 * MS));
    }

    #[test]
    fn cancel_all_clears() {
        let mut q = TimerQueue::new();
        q.schedule(1, MS);
        q.schedule(2, 2 * MS);
        q.cancel_all();
        assert!(q.is_empty());
        assert!(q.next_due().is_none());
    }
}
