//! Node orchestrator — the hexagonal core.
//!
//! [`Node`] owns the readiness gate, both schedulers, and the port
//! adapters.  [`run`] is the single entry point: it waits for every
//! subsystem, then starts the loops and never returns unless startup
//! fails.
//!
//! ```text
//!  SensorPort ──┐                              ┌──▶ SinkPort
//!               ▼                              │
//!   ┌──────────────────────────────────────────┴──┐
//!   │                   Node                      │ ──▶ EventSink
//!   │  ReadinessGate · SensorPollScheduler ·      │
//!   │  DayNightScheduler                          │
//!   └──────────────────────────────────────────┬──┘
//!               ▲                              │
//!   ClockPort ──┘                              └──▶ IndicatorPort
//! ```

use core::convert::Infallible;

use futures_lite::future;

use crate::error::Result;
use crate::readiness::{ReadinessGate, Subsystem};
use crate::scheduler::{DayNightScheduler, ScheduleOffset, SensorPollScheduler};

use super::events::NodeEvent;
use super::ports::{ClockPort, EventSink, IndicatorPort, SensorPort, SinkPort};

/// What the LED matrix does once the node starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorMode {
    /// Blank the matrix once and leave it off.
    ForcedOff,
    /// Follow the day/night schedule.
    DayNight(ScheduleOffset),
}

/// The sensor node: ports plus the two scheduling engines.
pub struct Node<C, S, I, K, E> {
    clock: C,
    sensors: S,
    indicator: I,
    sink: K,
    events: E,
    gate: ReadinessGate,
    poll: SensorPollScheduler,
    day_night: Option<DayNightScheduler>,
}

impl<C, S, I, K, E> Node<C, S, I, K, E>
where
    C: ClockPort,
    S: SensorPort,
    I: IndicatorPort,
    K: SinkPort,
    E: EventSink,
{
    /// Construct the node.  Nothing runs until [`run`] drives it.
    pub fn new(mode: IndicatorMode, clock: C, sensors: S, indicator: I, sink: K, events: E) -> Self {
        let day_night = match mode {
            IndicatorMode::ForcedOff => None,
            IndicatorMode::DayNight(offsets) => Some(DayNightScheduler::new(offsets)),
        };
        Self {
            clock,
            sensors,
            indicator,
            sink,
            events,
            gate: ReadinessGate::new(&Subsystem::ALL),
            poll: SensorPollScheduler::new(),
            day_night,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Wait until every subsystem has reported ready.
    ///
    /// Subsystems are awaited concurrently; each completion latches its bit
    /// in the gate.  Stays pending forever if one never reports.
    pub async fn wait_until_ready(&self) {
        let led = async {
            self.indicator.ready().await;
            self.report(Subsystem::LedMatrix);
        };
        let sensors = async {
            self.sensors.ready().await;
            self.report(Subsystem::Sensors);
        };
        future::zip(future::zip(led, sensors), self.gate.wait()).await;
        self.events.emit(&NodeEvent::AllReady);
    }

    /// Start the loops.  Only returns on a startup failure.
    ///
    /// With [`IndicatorMode::ForcedOff`] the matrix is blanked first; a
    /// failure there is fatal.  With [`IndicatorMode::DayNight`] both loops
    /// run side by side on this task.
    pub async fn start(&mut self) -> Result<Infallible> {
        let Self {
            clock,
            sensors,
            indicator,
            sink,
            events,
            poll,
            day_night,
            ..
        } = self;
        let clock = &*clock;
        let events = &*events;

        match day_night {
            None => {
                indicator.turn_off().await?;
                events.emit(&NodeEvent::Started { day_night: false });
                Ok(poll.run(clock, sensors, sink, events).await)
            }
            Some(day_night) => {
                events.emit(&NodeEvent::Started { day_night: true });
                let polling = poll.run(clock, sensors, sink, events);
                let toggling = day_night.run(clock, indicator, events);
                Ok(future::or(polling, toggling).await)
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    pub fn poll(&self) -> &SensorPollScheduler {
        &self.poll
    }

    pub fn day_night(&self) -> Option<&DayNightScheduler> {
        self.day_night.as_ref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    // ── Internal ──────────────────────────────────────────────

    fn report(&self, subsystem: Subsystem) {
        self.events.emit(&NodeEvent::SubsystemReady(subsystem));
        self.gate.signal_ready(subsystem);
    }
}

/// Drive `node`: wait for readiness, then start.
///
/// Returns only when startup fails.  The error is reported as
/// [`NodeEvent::Fatal`] and handed back so the process can exit and be
/// restarted by its supervisor.
pub async fn run<C, S, I, K, E>(node: &mut Node<C, S, I, K, E>) -> Result<Infallible>
where
    C: ClockPort,
    S: SensorPort,
    I: IndicatorPort,
    K: SinkPort,
    E: EventSink,
{
    node.wait_until_ready().await;
    match node.start().await {
        Ok(never) => match never {},
        Err(e) => {
            node.events.emit(&NodeEvent::Fatal(e));
            Err(e)
        }
    }
}
