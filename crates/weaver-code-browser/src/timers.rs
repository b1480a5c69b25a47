//! Browser timers driving the core throttle/debounce state machines.
//!
//! Each task owns its pending `Timeout`; dropping or cancelling the task
//! clears the timer so nothing fires against a detached editor.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use gloo_timers::callback::Timeout;
use web_time::Instant;
use weaver_code_core::{Debounce, Throttle, ThrottleAction};

type Work = Box<dyn Fn()>;

fn millis(delay: Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}

struct ThrottleInner {
    state: RefCell<Throttle>,
    timeout: RefCell<Option<Timeout>>,
    work: Work,
}

/// Runs `work` at most once per interval, with one trailing run.
pub struct ThrottledTask {
    inner: Rc<ThrottleInner>,
}

impl ThrottledTask {
    pub fn new(interval: Duration, work: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(ThrottleInner {
                state: RefCell::new(Throttle::new(interval)),
                timeout: RefCell::new(None),
                work: Box::new(work),
            }),
        }
    }

    pub fn trigger(&self) {
        let action = self.inner.state.borrow_mut().trigger(Instant::now());
        match action {
            ThrottleAction::RunNow => (self.inner.work)(),
            ThrottleAction::Schedule(delay) => {
                let weak = Rc::downgrade(&self.inner);
                let timeout = Timeout::new(millis(delay), move || Self::fire(weak));
                *self.inner.timeout.borrow_mut() = Some(timeout);
            }
            ThrottleAction::Coalesced => {}
        }
    }

    fn fire(weak: Weak<ThrottleInner>) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.timeout.borrow_mut().take();
        let run = inner.state.borrow_mut().fire(Instant::now());
        if run {
            (inner.work)();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.state.borrow().has_trailing()
    }

    pub fn cancel(&self) {
        self.inner.state.borrow_mut().cancel();
        if let Some(timeout) = self.inner.timeout.borrow_mut().take() {
            timeout.cancel();
        }
    }
}

impl Drop for ThrottledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct DebounceInner {
    state: RefCell<Debounce>,
    timeout: RefCell<Option<Timeout>>,
    work: Work,
}

/// Runs `work` once triggers have stopped for the delay.
pub struct DebouncedTask {
    inner: Rc<DebounceInner>,
}

impl DebouncedTask {
    pub fn new(delay: Duration, work: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(DebounceInner {
                state: RefCell::new(Debounce::new(delay)),
                timeout: RefCell::new(None),
                work: Box::new(work),
            }),
        }
    }

    /// Record activity and re-arm the timer.
    pub fn trigger(&self) {
        let delay = self.inner.state.borrow_mut().trigger(Instant::now());
        Self::arm(&self.inner, delay);
    }

    fn arm(inner: &Rc<DebounceInner>, delay: Duration) {
        let weak = Rc::downgrade(inner);
        // Replacing the handle drops, and so clears, the previous timeout.
        let timeout = Timeout::new(millis(delay), move || Self::fire(weak));
        *inner.timeout.borrow_mut() = Some(timeout);
    }

    fn fire(weak: Weak<DebounceInner>) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.timeout.borrow_mut().take();
        let now = Instant::now();
        let run = inner.state.borrow_mut().fire(now);
        if run {
            (inner.work)();
            return;
        }
        // Timer clocks can disagree by a millisecond; wait out the rest.
        let remaining = inner.state.borrow().remaining(now);
        if let Some(remaining) = remaining {
            Self::arm(&inner, remaining.max(Duration::from_millis(1)));
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.state.borrow().is_pending()
    }

    /// Run pending work immediately. Returns whether anything ran.
    pub fn flush(&self) -> bool {
        if let Some(timeout) = self.inner.timeout.borrow_mut().take() {
            timeout.cancel();
        }
        let pending = self.inner.state.borrow_mut().flush();
        if pending {
            (self.inner.work)();
        }
        pending
    }

    pub fn cancel(&self) {
        self.inner.state.borrow_mut().cancel();
        if let Some(timeout) = self.inner.timeout.borrow_mut().take() {
            timeout.cancel();
        }
    }
}

impl Drop for DebouncedTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
