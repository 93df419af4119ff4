//! Readiness gate.
//!
//! Hardware subsystems initialise independently and each reports exactly
//! once when it is done.  The gate latches those reports in a bitmask and
//! fires a single "ready" notification when every required bit is set.
//!
//! ## Gate lifecycle
//!
//! 1. The orchestrator builds the gate with the set of required subsystems.
//! 2. Each subsystem's completion calls [`ReadinessGate::signal_ready`],
//!    which sets its bit.  Bits never clear.
//! 3. The call that sets the last missing bit fires the gate; later calls
//!    (redundant or late reports) are no-ops.
//! 4. [`ReadinessGate::wait`] resolves once the gate has fired.
//!
//! A subsystem that never reports keeps the gate closed forever.  That is
//! a liveness stall, not an error.

use core::cell::{Cell, RefCell};
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::waitqueue::MultiWakerRegistration;

/// Waiters tracked at once; more are still released (see
/// [`MultiWakerRegistration::register`]).
const MAX_WAITERS: usize = 4;

/// Independently-initialising hardware subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Subsystem {
    /// The 8×8 LED matrix.
    LedMatrix = 0b0000_0001,
    /// The pressure and humidity sensors.
    Sensors = 0b0000_0010,
}

impl Subsystem {
    /// Every subsystem the node waits for.
    pub const ALL: [Subsystem; 2] = [Subsystem::LedMatrix, Subsystem::Sensors];

    /// Return the bitmask for this subsystem.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

/// One-shot "all subsystems ready" latch.
///
/// Single-threaded: the bitmask lives in a [`Cell`].  Every parked
/// [`wait`](Self::wait) is woken when the gate fires; once fired, later
/// waits return immediately.
pub struct ReadinessGate {
    /// Bits that must be set before the gate fires.
    required: u8,
    /// Latched reports.
    reported: Cell<u8>,
    /// Whether the ready notification has been sent.
    fired: Cell<bool>,
    waiters: RefCell<MultiWakerRegistration<MAX_WAITERS>>,
}

impl ReadinessGate {
    /// Gate over the given subsystems.
    pub fn new(required: &[Subsystem]) -> Self {
        let required = required.iter().fold(0, |mask, s| mask | s.mask());
        Self {
            required,
            reported: Cell::new(0),
            fired: Cell::new(false),
            waiters: RefCell::new(MultiWakerRegistration::new()),
        }
    }

    /// Record that `subsystem` finished initialising.
    ///
    /// Returns `true` only for the call that fired the gate.
    pub fn signal_ready(&self, subsystem: Subsystem) -> bool {
        self.reported.set(self.reported.get() | subsystem.mask());

        if self.fired.get() || !self.all_reported() {
            return false;
        }
        self.fired.set(true);
        self.waiters.borrow_mut().wake();
        true
    }

    /// Whether `subsystem` has reported.
    pub fn is_reported(&self, subsystem: Subsystem) -> bool {
        self.reported.get() & subsystem.mask() != 0
    }

    /// Whether the gate has fired.
    pub fn is_ready(&self) -> bool {
        self.fired.get()
    }

    /// Resolve once every required subsystem has reported.
    pub async fn wait(&self) {
        poll_fn(|cx| {
            if self.fired.get() {
                Poll::Ready(())
            } else {
                self.waiters.borrow_mut().register(cx.waker());
                Poll::Pending
            }
        })
        .await;
    }

    fn all_reported(&self) -> bool {
        self.reported.get() & self.required == self.required
    }
}
