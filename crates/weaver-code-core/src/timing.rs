//! Throttle and debounce state machines.
//!
//! These only decide *when* work should run; the browser crate owns the
//! actual timers. Every method takes the current instant so the logic can be
//! driven deterministically in tests.

use std::time::Duration;

use web_time::Instant;

/// What a throttled trigger should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleAction {
    /// Run the work now.
    RunNow,
    /// Arm a trailing run after this delay.
    Schedule(Duration),
    /// A trailing run is already armed; nothing to do.
    Coalesced,
}

/// Leading-edge throttle with a single trailing run.
///
/// The first trigger runs immediately. Triggers inside the window after a
/// run collapse into exactly one trailing run at the end of the window.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
    trailing: bool,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            trailing: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn trigger(&mut self, now: Instant) -> ThrottleAction {
        if self.trailing {
            return ThrottleAction::Coalesced;
        }
        match self.last_run {
            Some(last) if now.duration_since(last) < self.interval => {
                self.trailing = true;
                ThrottleAction::Schedule(self.interval - now.duration_since(last))
            }
            _ => {
                self.last_run = Some(now);
                ThrottleAction::RunNow
            }
        }
    }

    /// The trailing timer fired. Returns whether the work should run.
    pub fn fire(&mut self, now: Instant) -> bool {
        if !self.trailing {
            return false;
        }
        self.trailing = false;
        self.last_run = Some(now);
        true
    }

    pub fn has_trailing(&self) -> bool {
        self.trailing
    }

    /// Forget any armed trailing run.
    pub fn cancel(&mut self) {
        self.trailing = false;
    }
}

/// Trailing-edge debounce: work runs once the triggers stop for `delay`.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    last_trigger: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_trigger: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record activity. Returns the delay to (re)arm the timer with.
    pub fn trigger(&mut self, now: Instant) -> Duration {
        self.last_trigger = Some(now);
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.last_trigger.is_some()
    }

    /// Time left before the work is due, if any is pending.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.last_trigger
            .map(|t| self.delay.saturating_sub(now.duration_since(t)))
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.remaining(now).is_some_and(|left| left.is_zero())
    }

    /// The timer fired. Returns whether the work should run now.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.last_trigger = None;
            true
        } else {
            false
        }
    }

    /// Run now regardless of the delay. Returns whether anything was pending.
    pub fn flush(&mut self) -> bool {
        self.last_trigger.take().is_some()
    }

    pub fn cancel(&mut self) {
        self.last_trigger = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_throttle_leading_then_single_trailing() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(16 * MS);
        assert_eq!(throttle.trigger(t0), ThrottleAction::RunNow);
        assert_eq!(throttle.trigger(t0 + 4 * MS), ThrottleAction::Schedule(12 * MS));
        assert_eq!(throttle.trigger(t0 + 8 * MS), ThrottleAction::Coalesced);
        assert_eq!(throttle.trigger(t0 + 9 * MS), ThrottleAction::Coalesced);
        assert!(throttle.fire(t0 + 16 * MS));
        // Only one trailing run.
        assert!(!throttle.fire(t0 + 17 * MS));
        // The window restarts from the trailing run.
        assert_eq!(throttle.trigger(t0 + 20 * MS), ThrottleAction::Schedule(12 * MS));
    }

    #[test]
    fn test_throttle_idle_runs_immediately() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(16 * MS);
        assert_eq!(throttle.trigger(t0), ThrottleAction::RunNow);
        assert_eq!(throttle.trigger(t0 + 40 * MS), ThrottleAction::RunNow);
    }

    #[test]
    fn test_throttle_cancel() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(16 * MS);
        throttle.trigger(t0);
        throttle.trigger(t0 + MS);
        throttle.cancel();
        assert!(!throttle.has_trailing());
        assert!(!throttle.fire(t0 + 16 * MS));
    }

    #[test]
    fn test_debounce_resets_on_trigger() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(300 * MS);
        assert_eq!(debounce.trigger(t0), 300 * MS);
        debounce.trigger(t0 + 200 * MS);
        // The first timer fires but the second trigger pushed the deadline out.
        assert!(!debounce.fire(t0 + 300 * MS));
        assert_eq!(debounce.remaining(t0 + 300 * MS), Some(200 * MS));
        assert!(debounce.fire(t0 + 500 * MS));
        assert!(!debounce.is_pending());
        assert!(!debounce.fire(t0 + 900 * MS));
    }

    #[test]
    fn test_debounce_flush_and_cancel() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(300 * MS);
        assert!(!debounce.flush());
        debounce.trigger(t0);
        assert!(debounce.flush());
        debounce.trigger(t0);
        debounce.cancel();
        assert!(!debounce.fire(t0 + 300 * MS));
    }
}
