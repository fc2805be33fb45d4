//! Host-driven timers for round pacing.
//!
//! A `Scheduler` keeps its own virtual clock that only moves when the host
//! calls [`Scheduler::pop_due`] / [`Scheduler::settle`] with a new deadline.
//! Events are plain values, so a round machine owns its scheduler and matches
//! on what fired instead of registering callbacks.
//!
//! ```
//! # use std::time::Duration;
//! # use arcade_core::timer::Scheduler;
//! let mut timers = Scheduler::new();
//! timers.after(Duration::from_secs(1), "tick");
//! let deadline = timers.now() + Duration::from_millis(1500);
//! assert_eq!(timers.pop_due(deadline), Some("tick"));
//! timers.settle(deadline);
//! assert_eq!(timers.now(), Duration::from_millis(1500));
//! ```

use std::time::Duration;

/// Cancellation handle returned by [`Scheduler::after`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Pending<E> {
    handle: TimerHandle,
    due: Duration,
    event: E,
}

#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now: Duration,
    next_handle: u64,
    /// Sorted by `(due, handle)`.
    pending: Vec<Pending<E>>,
    paused: bool,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            pending: Vec::new(),
            paused: false,
        }
    }

    /// Virtual time elapsed while not paused.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Schedules `event` to fire `delay` from now.
    pub fn after(&mut self, delay: Duration, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let due = self.now + delay;
        let at = self
            .pending
            .partition_point(|p| (p.due, p.handle.0) <= (due, handle.0));
        self.pending.insert(at, Pending { handle, due, event });
        handle
    }

    /// Cancels a timer, returning how long it still had to run.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<Duration> {
        let index = self.pending.iter().position(|p| p.handle == handle)?;
        let pending = self.pending.remove(index);
        Some(pending.due.saturating_sub(self.now))
    }

    #[must_use]
    pub fn remaining(&self, handle: TimerHandle) -> Option<Duration> {
        self.pending
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| p.due.saturating_sub(self.now))
    }

    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Stops the clock. Pending timers keep their remaining time and nothing
    /// fires until [`Scheduler::resume`].
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Drops every pending timer and restarts the clock at zero.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.now = Duration::ZERO;
        self.paused = false;
    }

    /// Pops the earliest timer due at or before `deadline`, moving the clock to
    /// its due time. Returns `None` while paused.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<E> {
        if self.paused {
            return None;
        }
        if self.pending.first()?.due > deadline {
            return None;
        }
        let pending = self.pending.remove(0);
        self.now = self.now.max(pending.due);
        Some(pending.event)
    }

    /// Moves the clock to `deadline` once every due timer has been popped.
    pub fn settle(&mut self, deadline: Duration) {
        if !self.paused {
            self.now = self.now.max(deadline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(timers: &mut Scheduler<&'static str>, by: Duration) -> Vec<&'static str> {
        let deadline = timers.now() + by;
        let mut fired = Vec::new();
        while let Some(event) = timers.pop_due(deadline) {
            fired.push(event);
        }
        timers.settle(deadline);
        fired
    }

    #[test]
    fn fires_in_due_order() {
        let mut timers = Scheduler::new();
        timers.after(Duration::from_secs(3), "c");
        timers.after(Duration::from_secs(1), "a");
        timers.after(Duration::from_secs(2), "b");
        assert_eq!(drain(&mut timers, Duration::from_secs(5)), vec!["a", "b", "c"]);
        assert_eq!(timers.now(), Duration::from_secs(5));
    }

    #[test]
    fn equal_due_times_fire_in_schedule_order() {
        let mut timers = Scheduler::new();
        timers.after(Duration::from_secs(1), "first");
        timers.after(Duration::from_secs(1), "second");
        assert_eq!(drain(&mut timers, Duration::from_secs(1)), vec!["first", "second"]);
    }

    #[test]
    fn cancel_reports_remaining_time() {
        let mut timers = Scheduler::new();
        let handle = timers.after(Duration::from_secs(10), "late");
        drain(&mut timers, Duration::from_secs(4));
        assert_eq!(timers.cancel(handle), Some(Duration::from_secs(6)));
        assert_eq!(timers.cancel(handle), None);
        assert!(drain(&mut timers, Duration::from_secs(60)).is_empty());
    }

    #[test]
    fn pause_freezes_clock_and_keeps_remaining() {
        let mut timers = Scheduler::new();
        let handle = timers.after(Duration::from_secs(2), "tick");
        drain(&mut timers, Duration::from_millis(500));

        timers.pause();
        assert!(drain(&mut timers, Duration::from_secs(30)).is_empty());
        assert_eq!(timers.now(), Duration::from_millis(500));
        assert_eq!(timers.remaining(handle), Some(Duration::from_millis(1500)));

        timers.resume();
        assert!(drain(&mut timers, Duration::from_millis(1499)).is_empty());
        assert_eq!(drain(&mut timers, Duration::from_millis(1)), vec!["tick"]);
    }

    #[test]
    fn events_scheduled_while_draining_use_the_fired_time() {
        let mut timers = Scheduler::new();
        timers.after(Duration::from_secs(1), "tick");
        let deadline = timers.now() + Duration::from_millis(3_500);
        let mut fired = 0;
        while let Some(event) = timers.pop_due(deadline) {
            fired += 1;
            timers.after(Duration::from_secs(1), event);
        }
        timers.settle(deadline);
        assert_eq!(fired, 3);
        assert_eq!(timers.pending_len(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let mut timers = Scheduler::new();
        timers.after(Duration::from_secs(1), "stale");
        timers.pause();
        timers.clear();
        assert_eq!(timers.pending_len(), 0);
        assert!(!timers.is_paused());
        assert_eq!(timers.now(), Duration::ZERO);
    }
}
