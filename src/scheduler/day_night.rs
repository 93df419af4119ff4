//! Day/night indicator schedule.
//!
//! The LED matrix is lit between a turn-on and a turn-off time of day.
//! The window may sit inside one day (`on < off`, e.g. 08:00–22:00) or
//! wrap past midnight (`on > off`, e.g. 22:00–08:00).
//!
//! ```text
//!            turn_on()                    turn_off()
//!   ┌─────┐ ─────────────▶ ┌────┐ ─────────────▶ ┌─────┐
//!   │ Off │                │ On │                │ Off │ ...
//!   └─────┘ ◀── arms ───── └────┘ ◀── arms ───── └─────┘
//! ```
//!
//! Each toggle arms exactly one timer for the opposite toggle, so once the
//! loop runs there is always one pending timer.

use core::convert::Infallible;
use core::fmt;
use core::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};

use crate::app::events::NodeEvent;
use crate::app::ports::{ClockPort, EventSink, IndicatorPort};
use crate::error::ConfigError;

use super::{MS_PER_DAY, ms_since_midnight};

/// Indicator on/off state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    On,
    Off,
}

impl IndicatorState {
    pub fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Schedule offsets (pure time-of-day arithmetic)
// ═══════════════════════════════════════════════════════════════

/// Turn-on and turn-off times as milliseconds since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOffset {
    turn_on_ms: u32,
    turn_off_ms: u32,
}

impl ScheduleOffset {
    /// Both offsets must lie in `[0, MS_PER_DAY)`.
    pub fn new(turn_on_ms: u32, turn_off_ms: u32) -> Result<Self, ConfigError> {
        if turn_on_ms >= MS_PER_DAY {
            return Err(ConfigError::ValidationFailed(
                "turn_on_offset_ms must be below 86400000",
            ));
        }
        if turn_off_ms >= MS_PER_DAY {
            return Err(ConfigError::ValidationFailed(
                "turn_off_offset_ms must be below 86400000",
            ));
        }
        Ok(Self {
            turn_on_ms,
            turn_off_ms,
        })
    }

    pub fn turn_on_ms(&self) -> u32 {
        self.turn_on_ms
    }

    pub fn turn_off_ms(&self) -> u32 {
        self.turn_off_ms
    }

    /// The lit window spans midnight (e.g. 22:00–08:00).
    pub fn wraps_midnight(&self) -> bool {
        self.turn_on_ms > self.turn_off_ms
    }

    /// Equal offsets: a 24-hour window in a single state.
    /// Policy: always on.
    pub fn is_degenerate(&self) -> bool {
        self.turn_on_ms == self.turn_off_ms
    }

    /// The state the indicator should be in at `now_ms` since midnight.
    pub fn state_at(&self, now_ms: u32) -> IndicatorState {
        let lit = if self.is_degenerate() {
            true
        } else if self.wraps_midnight() {
            now_ms >= self.turn_on_ms || now_ms < self.turn_off_ms
        } else {
            now_ms >= self.turn_on_ms && now_ms < self.turn_off_ms
        };
        if lit {
            IndicatorState::On
        } else {
            IndicatorState::Off
        }
    }

    /// Delay in ms from `now_ms` until the next turn-on.
    ///
    /// Tomorrow's turn-on is targeted when the window stays inside one day
    /// and today's turn-on already passed.  The result is normalised into
    /// `[0, MS_PER_DAY)` so a late or early caller never gets a negative
    /// or more-than-a-day delay.
    pub fn delay_until_turn_on(&self, now_ms: u32) -> u32 {
        let target = if self.turn_on_ms < self.turn_off_ms && now_ms > self.turn_on_ms {
            self.turn_on_ms + MS_PER_DAY
        } else {
            self.turn_on_ms
        };
        wrap_day(target, now_ms)
    }

    /// Delay in ms from `now_ms` until the next turn-off.
    ///
    /// A wrapped window always turns off tomorrow.  Normalised like
    /// [`delay_until_turn_on`](Self::delay_until_turn_on).
    pub fn delay_until_turn_off(&self, now_ms: u32) -> u32 {
        let target = if self.turn_off_ms < self.turn_on_ms {
            self.turn_off_ms + MS_PER_DAY
        } else {
            self.turn_off_ms
        };
        wrap_day(target, now_ms)
    }
}

fn wrap_day(target_ms: u32, now_ms: u32) -> u32 {
    (i64::from(target_ms) - i64::from(now_ms)).rem_euclid(i64::from(MS_PER_DAY)) as u32
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler loop
// ═══════════════════════════════════════════════════════════════

/// Mutually re-arming `turn_on` / `turn_off` loop.
///
/// Ports are passed at call sites; the scheduler only owns its schedule
/// and bookkeeping.
pub struct DayNightScheduler {
    offsets: ScheduleOffset,
    /// Last state commanded (regardless of whether the port succeeded).
    state: Option<IndicatorState>,
    /// When the pending toggle is due.
    next_toggle_at: Option<NaiveDateTime>,
}

impl DayNightScheduler {
    pub fn new(offsets: ScheduleOffset) -> Self {
        Self {
            offsets,
            state: None,
            next_toggle_at: None,
        }
    }

    pub fn offsets(&self) -> ScheduleOffset {
        self.offsets
    }

    pub fn state(&self) -> Option<IndicatorState> {
        self.state
    }

    pub fn next_toggle_at(&self) -> Option<NaiveDateTime> {
        self.next_toggle_at
    }

    /// Blank the matrix and compute the wait until the next turn-on.
    ///
    /// Returns what is left of that wait once the port call completes.
    pub async fn turn_off(
        &mut self,
        clock: &impl ClockPort,
        indicator: &mut impl IndicatorPort,
        events: &impl EventSink,
    ) -> Duration {
        let now = clock.now();
        let delay_ms = self.offsets.delay_until_turn_on(ms_since_midnight(now));
        let result = indicator.turn_off().await;
        self.switched(IndicatorState::Off, now, delay_ms, result.err().map(Into::into), clock, events)
    }

    /// Light the matrix and compute the wait until the next turn-off.
    ///
    /// With a degenerate window there is no turn-off; the `On` state is
    /// re-asserted once a day instead.
    pub async fn turn_on(
        &mut self,
        clock: &impl ClockPort,
        indicator: &mut impl IndicatorPort,
        events: &impl EventSink,
    ) -> Duration {
        let now = clock.now();
        let delay_ms = if self.offsets.is_degenerate() {
            MS_PER_DAY
        } else {
            self.offsets.delay_until_turn_off(ms_since_midnight(now))
        };
        let result = indicator.turn_on().await;
        self.switched(IndicatorState::On, now, delay_ms, result.err().map(Into::into), clock, events)
    }

    /// Apply the state due right now, then again after every wake.
    ///
    /// The state is re-read from the wall clock on each wake, so a timer
    /// that fires hours late (suspend, clock step) lands on the right side.
    pub async fn run(
        &mut self,
        clock: &impl ClockPort,
        indicator: &mut impl IndicatorPort,
        events: &impl EventSink,
    ) -> Infallible {
        loop {
            let wait = match self.offsets.state_at(ms_since_midnight(clock.now())) {
                IndicatorState::On => self.turn_on(clock, indicator, events).await,
                IndicatorState::Off => self.turn_off(clock, indicator, events).await,
            };
            clock.sleep(wait).await;
        }
    }

    fn switched(
        &mut self,
        state: IndicatorState,
        started: NaiveDateTime,
        delay_ms: u32,
        error: Option<crate::error::Error>,
        clock: &impl ClockPort,
        events: &impl EventSink,
    ) -> Duration {
        let deadline = started + TimeDelta::milliseconds(i64::from(delay_ms));
        self.state = Some(state);
        self.next_toggle_at = Some(deadline);

        match error {
            None => events.emit(&NodeEvent::IndicatorSwitched {
                state,
                next_toggle_in: Duration::from_millis(u64::from(delay_ms)),
            }),
            Some(error) => events.emit(&NodeEvent::IndicatorFailed { state, error }),
        }

        // Port I/O already used part of the delay.
        (deadline - clock.now()).to_std().unwrap_or(Duration::ZERO)
    }
}
