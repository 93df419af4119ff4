//! Minute-aligned sensor polling.
//!
//! ```text
//!   Idle ──arm──▶ Scheduled ──boundary──▶ Running ──┬─▶ Success ─┐
//!                     ▲                             └─▶ Failed  ─┤
//!                     └──────────────── arm ◀────────────────────┘
//! ```
//!
//! Every cycle reads the sensors, forwards the reading to the sink and
//! reports it.  Whatever happens, the next cycle is armed for the next top
//! of the minute, derived from the wall clock after the cycle finished.
//! The next cycle is only armed once the current one completed, so runs
//! never overlap.

use core::convert::Infallible;
use core::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};
use heapless::HistoryBuffer;

use crate::app::events::NodeEvent;
use crate::app::ports::{ClockPort, EventSink, SensorPort, SinkPort};
use crate::app::reading::SensorReading;
use crate::error::Result;

use super::ms_until_next_minute;

/// Number of readings kept in memory (one hour at one per minute).
pub const HISTORY_LEN: usize = 60;

/// Where the poll loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Not armed yet.
    Idle,
    /// Waiting for the boundary at `at`.
    Scheduled { at: NaiveDateTime },
    /// A cycle is in flight.
    Running,
}

/// Cycle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// A reading with the wall-clock time its cycle started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedReading {
    pub at: NaiveDateTime,
    pub reading: SensorReading,
}

/// Self-rescheduling poll loop.
pub struct SensorPollScheduler {
    state: PollState,
    /// Boundary the most recent arm targeted.
    deadline: Option<NaiveDateTime>,
    /// Start of the most recent cycle, successful or not.
    last_run: Option<NaiveDateTime>,
    stats: PollStats,
    history: HistoryBuffer<TimedReading, HISTORY_LEN>,
}

impl Default for SensorPollScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPollScheduler {
    pub fn new() -> Self {
        Self {
            state: PollState::Idle,
            deadline: None,
            last_run: None,
            stats: PollStats::default(),
            history: HistoryBuffer::new(),
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn last_run(&self) -> Option<NaiveDateTime> {
        self.last_run
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    /// Most recent successful reading.
    pub fn latest(&self) -> Option<&TimedReading> {
        self.history.recent()
    }

    /// Retained readings, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TimedReading> {
        self.history.oldest_ordered()
    }

    /// Arm the next cycle for the next top of the minute.
    ///
    /// The target is always strictly after the previously armed boundary,
    /// so a wall clock lagging behind the timer cannot repeat a minute.
    /// Returns the delay until then.
    pub fn arm(&mut self, clock: &impl ClockPort) -> Duration {
        let now = clock.now();
        let mut at = now + TimeDelta::milliseconds(i64::from(ms_until_next_minute(now)));
        if let Some(previous) = self.deadline {
            if at <= previous {
                at = previous + TimeDelta::minutes(1);
            }
        }
        self.deadline = Some(at);
        self.state = PollState::Scheduled { at };
        (at - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Run one read → forward → report cycle.
    ///
    /// Failures are reported through `events` and returned; they never
    /// leave the scheduler in a state that blocks the next cycle.
    pub async fn run_cycle(
        &mut self,
        clock: &impl ClockPort,
        sensors: &mut impl SensorPort,
        sink: &mut impl SinkPort,
        events: &impl EventSink,
    ) -> Result<SensorReading> {
        let started = clock.now();
        self.state = PollState::Running;
        self.last_run = Some(started);
        self.stats.attempted += 1;

        let outcome = read_and_forward(sensors, sink).await;
        match outcome {
            Ok(reading) => {
                self.stats.succeeded += 1;
                self.history.write(TimedReading {
                    at: started,
                    reading,
                });
                events.emit(&NodeEvent::Reading(reading));
            }
            Err(e) => {
                self.stats.failed += 1;
                events.emit(&NodeEvent::CycleFailed(e));
            }
        }
        outcome
    }

    /// Poll forever.  The first cycle waits for the next minute boundary.
    pub async fn run(
        &mut self,
        clock: &impl ClockPort,
        sensors: &mut impl SensorPort,
        sink: &mut impl SinkPort,
        events: &impl EventSink,
    ) -> Infallible {
        let mut delay = self.arm(clock);
        events.emit(&NodeEvent::PollArmed { delay });
        loop {
            clock.sleep(delay).await;
            // Already reported; the loop only cares that the cycle ended.
            let _ = self.run_cycle(clock, sensors, sink, events).await;
            delay = self.arm(clock);
        }
    }
}

async fn read_and_forward(
    sensors: &mut impl SensorPort,
    sink: &mut impl SinkPort,
) -> Result<SensorReading> {
    let reading = sensors.read().await?;
    sink.post(reading).await?;
    Ok(reading)
}
