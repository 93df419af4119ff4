//! Clock adapters.
//!
//! - [`SystemClock`]: local wall-clock time from the OS (via `chrono`)
//!   and reactor-driven timers from `async-io-mini`.
//! - [`ManualClock`]: a virtual clock for tests and simulation.  Time only
//!   moves when told to; timers resolve once virtual time reaches their
//!   deadline.

use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use core::time::Duration;

use chrono::{Local, NaiveDateTime, TimeDelta};

use crate::app::ports::ClockPort;

// ───────────────────────────────────────────────────────────────
// System clock
// ───────────────────────────────────────────────────────────────

/// Production clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        async move {
            async_io_mini::Timer::after(duration).await;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Manual clock
// ───────────────────────────────────────────────────────────────

/// Virtual clock with explicit time control.
///
/// Every [`sleep`](ClockPort::sleep) registers a timer right away, so
/// [`pending_timers`](Self::pending_timers) reflects armed-but-unfired
/// timers even before the returned future is first polled.
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
    next_id: Cell<u64>,
    /// Armed timers: (id, deadline).
    timers: RefCell<Vec<(u64, NaiveDateTime)>>,
    /// Every duration ever requested, in order.
    requested: RefCell<Vec<Duration>>,
    wakers: RefCell<Vec<Waker>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(start),
            next_id: Cell::new(0),
            timers: RefCell::new(Vec::new()),
            requested: RefCell::new(Vec::new()),
            wakers: RefCell::new(Vec::new()),
        }
    }

    /// Move virtual time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let step = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        let now = self.now.get();
        self.set(now.checked_add_signed(step).unwrap_or(NaiveDateTime::MAX));
    }

    /// Jump to an absolute time (forwards or backwards).
    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
        for waker in self.wakers.borrow_mut().drain(..) {
            waker.wake();
        }
    }

    /// Jump to the earliest armed deadline, if any.
    pub fn advance_to_next_deadline(&self) -> Option<NaiveDateTime> {
        let next = self.next_deadline()?;
        if next > self.now.get() {
            self.set(next);
        }
        Some(next)
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<NaiveDateTime> {
        self.timers.borrow().iter().map(|&(_, at)| at).min()
    }

    /// Number of armed timers that have not fired (or been dropped).
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Every sleep duration requested so far, oldest first.
    pub fn requested_sleeps(&self) -> Vec<Duration> {
        self.requested.borrow().clone()
    }

    fn arm(&self, duration: Duration) -> (u64, NaiveDateTime) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let step = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        let deadline = self
            .now
            .get()
            .checked_add_signed(step)
            .unwrap_or(NaiveDateTime::MAX);
        self.timers.borrow_mut().push((id, deadline));
        self.requested.borrow_mut().push(duration);
        (id, deadline)
    }

    fn disarm(&self, id: u64) {
        self.timers.borrow_mut().retain(|&(timer, _)| timer != id);
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        let (id, deadline) = self.arm(duration);
        ManualSleep {
            clock: self,
            id,
            deadline,
            done: false,
        }
    }
}

/// Timer future returned by [`ManualClock::sleep`].
pub struct ManualSleep<'a> {
    clock: &'a ManualClock,
    id: u64,
    deadline: NaiveDateTime,
    done: bool,
}

impl Future for ManualSleep<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(());
        }
        if this.clock.now() >= this.deadline {
            this.done = true;
            this.clock.disarm(this.id);
            return Poll::Ready(());
        }
        this.clock.wakers.borrow_mut().push(cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for ManualSleep<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.clock.disarm(self.id);
        }
    }
}
