//! Wall-clock scheduling engines.
//!
//! Two independent loops share one [`ClockPort`](crate::app::ports::ClockPort):
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        ClockPort                             │
//! │               now() · sleep(duration)                        │
//! └──────────────┬───────────────────────────────┬───────────────┘
//!                │                               │
//!                ▼                               ▼
//!  ┌───────────────────────────┐   ┌───────────────────────────┐
//!  │  SensorPollScheduler      │   │  DayNightScheduler        │
//!  │  top of every minute:     │   │  Off ⇄ On at two          │
//!  │  read → forward → log     │   │  time-of-day offsets      │
//!  └───────────────────────────┘   └───────────────────────────┘
//! ```
//!
//! Both derive every delay from the wall clock at the moment they re-arm,
//! never from the previous delay, so execution time does not accumulate.

pub mod day_night;
pub mod poll;

pub use day_night::{DayNightScheduler, IndicatorState, ScheduleOffset};
pub use poll::{PollState, PollStats, SensorPollScheduler, TimedReading};

use chrono::{NaiveDateTime, Timelike};

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u32 = 60_000;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u32 = 60 * MS_PER_MINUTE;

/// Milliseconds per day; offsets-since-midnight live in `[0, MS_PER_DAY)`.
pub const MS_PER_DAY: u32 = 24 * MS_PER_HOUR;

/// Millisecond component of `t`, clamped so a leap second never reads as
/// a full extra second.
fn millis_of_second(t: NaiveDateTime) -> u32 {
    (t.nanosecond() / 1_000_000).min(999)
}

/// Milliseconds elapsed since local midnight.
pub fn ms_since_midnight(t: NaiveDateTime) -> u32 {
    t.num_seconds_from_midnight() * 1000 + millis_of_second(t)
}

/// Milliseconds until the next top of the minute, in `(0, 60_000]`.
///
/// Exactly on a boundary this is a full minute: the run that just
/// happened owns the current boundary.
pub fn ms_until_next_minute(t: NaiveDateTime) -> u32 {
    MS_PER_MINUTE - (t.second() * 1000 + millis_of_second(t))
}
