//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Node / schedulers (domain)
//! ```
//!
//! Driven adapters (sensors, LED matrix, HTTP sink, clock, logger) implement
//! these traits.  The schedulers receive them at call sites, so the domain
//! core never touches hardware, sockets, or the system clock directly.
//!
//! Async methods are declared as `fn … -> impl Future` so implementations
//! may simply write `async fn`.  Everything runs on one cooperative
//! executor; nothing here needs `Send`.

use core::future::Future;
use core::time::Duration;

use chrono::NaiveDateTime;

use crate::config::NodeConfig;
use crate::error::{ConfigError, IndicatorError, SensorError, SinkError};

use super::events::NodeEvent;
use super::reading::SensorReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Resolves once the sensor subsystem has finished initialising.
    ///
    /// Resolves at most once per adapter lifetime; an adapter that can
    /// never initialise stays pending forever.
    fn ready(&self) -> impl Future<Output = ()>;

    /// Sample every environmental channel.  Failures are transient.
    fn read(&mut self) -> impl Future<Output = Result<SensorReading, SensorError>>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LED matrix)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the LED matrix.
pub trait IndicatorPort {
    /// Resolves once the matrix has finished initialising.
    fn ready(&self) -> impl Future<Output = ()>;

    /// Light the matrix.
    fn turn_on(&mut self) -> impl Future<Output = Result<(), IndicatorError>>;

    /// Blank the matrix.
    fn turn_off(&mut self) -> impl Future<Output = Result<(), IndicatorError>>;
}

// ───────────────────────────────────────────────────────────────
// Sink port (driven adapter: domain → local HTTP API)
// ───────────────────────────────────────────────────────────────

/// Destination for every successful reading.
pub trait SinkPort {
    /// Forward one reading; ownership moves to the sink.
    fn post(&mut self, reading: SensorReading) -> impl Future<Output = Result<(), SinkError>>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock + timers)
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time and timers.
///
/// Injected so minute alignment and midnight wrap-around can be tested
/// deterministically (see [`ManualClock`](crate::adapters::time::ManualClock)).
pub trait ClockPort {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Resolve after `duration` has elapsed on this clock.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

impl<C: ClockPort + ?Sized> ClockPort for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        (**self).sleep(duration)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`NodeEvent`]s through this port.
/// Adapters decide where they go; [`LogEventSink`](crate::adapters::log_sink::LogEventSink)
/// renders them as leveled log lines.
///
/// Takes `&self` because both scheduler loops share one sink.
pub trait EventSink {
    fn emit(&self, event: &NodeEvent);
}

impl<E: EventSink + ?Sized> EventSink for &E {
    fn emit(&self, event: &NodeEvent) {
        (**self).emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists node configuration.
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ConfigError::NotFound`] if nothing is stored yet.
    fn load(&self) -> Result<NodeConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &NodeConfig) -> Result<(), ConfigError>;
}
