//! Outbound node events.
//!
//! The orchestrator and both schedulers emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, record them in
//! tests, etc.

use core::fmt;
use core::time::Duration;

use crate::error::Error;
use crate::readiness::Subsystem;
use crate::scheduler::IndicatorState;

use super::reading::SensorReading;

/// Structured events emitted by the node core.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// One subsystem reported that its initialisation completed.
    SubsystemReady(Subsystem),

    /// Every subsystem is ready; the node is about to start.
    AllReady,

    /// Both loops are armed.  `day_night` tells whether the indicator
    /// follows its schedule or was forced off.
    Started { day_night: bool },

    /// The first poll cycle was armed `delay` ahead of the minute boundary.
    PollArmed { delay: Duration },

    /// A poll cycle read and forwarded a reading.
    Reading(SensorReading),

    /// A poll cycle failed; the loop carries on at the next boundary.
    CycleFailed(Error),

    /// The indicator was switched and the opposite toggle is armed.
    IndicatorSwitched {
        state: IndicatorState,
        next_toggle_in: Duration,
    },

    /// The indicator rejected a command.  The schedule still re-arms.
    IndicatorFailed {
        state: IndicatorState,
        error: Error,
    },

    /// `start` failed; the node stops and expects to be restarted.
    Fatal(Error),
}

/// Human-readable one-line reading summary.
pub fn reading_summary(reading: &SensorReading) -> String {
    format!(
        "Temperature: {:.1}\u{00b0}c, pressure: {}hPa, humidity: {}%",
        reading.average_temperature(),
        reading.pressure,
        reading.humidity,
    )
}

/// Formats a delay as `HH:MM:SS.mmm` for schedule log lines.
pub struct Hms(pub Duration);

impl fmt::Display for Hms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = self.0.as_millis();
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms / 60_000) % 60;
        let seconds = (total_ms / 1000) % 60;
        let millis = total_ms % 1000;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    }
}
