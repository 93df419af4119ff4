//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured node events to the `log`
//! facade (which `env_logger` sends to stderr, captured by the service
//! supervisor's journal).

use log::{error, info};

use crate::app::events::{Hms, NodeEvent, reading_summary};
use crate::app::ports::EventSink;
use crate::scheduler::IndicatorState;

/// Adapter that logs every [`NodeEvent`] at the matching level.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &NodeEvent) {
        match event {
            NodeEvent::SubsystemReady(subsystem) => {
                info!("READY | {:?}", subsystem);
            }
            NodeEvent::AllReady => {
                info!("READY | initialization finished");
            }
            NodeEvent::Started { day_night } => {
                let led = if *day_night { "day/night schedule" } else { "forced off" };
                info!("START | loop started, led matrix {}", led);
            }
            NodeEvent::PollArmed { delay } => {
                info!("POLL | first reading in {}", Hms(*delay));
            }
            NodeEvent::Reading(reading) => {
                info!("POLL | {}", reading_summary(reading));
            }
            NodeEvent::CycleFailed(e) => {
                error!("POLL | unable to retrieve or save the sensor data: {}", e);
            }
            NodeEvent::IndicatorSwitched {
                state,
                next_toggle_in,
            } => {
                let next = match state {
                    IndicatorState::On => "off",
                    IndicatorState::Off => "on",
                };
                info!(
                    "LED | turned {}, will be turned {} in {} ({}ms)",
                    state,
                    next,
                    Hms(*next_toggle_in),
                    next_toggle_in.as_millis()
                );
            }
            NodeEvent::IndicatorFailed { state, error } => {
                error!("LED | failed to turn {}: {}", state, error);
            }
            NodeEvent::Fatal(e) => {
                error!("FATAL | node failed with error {}", e);
            }
        }
    }
}
