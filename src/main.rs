//! SenseNode — Main Entry Point
//!
//! Sense HAT sensor node: polls the environment sensors once a minute,
//! forwards each reading to the local HTTP API, and optionally lights the
//! LED matrix on a day/night schedule.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  IioSensors / SimulatedSensors   LedMatrix / SimulatedMatrix   │
//! │  (SensorPort)                    (IndicatorPort)               │
//! │  HttpSink      LogEventSink      SystemClock   JsonConfigStore │
//! │  (SinkPort)    (EventSink)       (ClockPort)   (ConfigPort)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                  Node (pure logic)                     │    │
//! │  │  ReadinessGate · SensorPollScheduler · DayNightSched.  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use core::time::Duration;

use anyhow::Result;
use futures_lite::future;
use log::{info, warn};

use sensenode::adapters::config_file::JsonConfigStore;
use sensenode::adapters::http_sink::HttpSink;
use sensenode::adapters::log_sink::LogEventSink;
use sensenode::adapters::sense_hat::{IioSensors, LedMatrix};
use sensenode::adapters::simulated::{SimulatedMatrix, SimulatedSensors};
use sensenode::adapters::time::SystemClock;
use sensenode::app::ports::{ClockPort, ConfigPort, IndicatorPort, SensorPort};
use sensenode::app::service::{IndicatorMode, Node, run};
use sensenode::config::{HardwareKind, NodeConfig};
use sensenode::error::{ConfigError, Error};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "SENSENODE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "sensenode.json";

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("SenseNode v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Load config (or defaults) ──────────────────────────
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let store = JsonConfigStore::new(path);
    let config = match store.load() {
        Ok(cfg) => cfg,
        Err(ConfigError::NotFound) => {
            info!("No config at {}, using defaults", store.path().display());
            NodeConfig::default()
        }
        Err(e) => {
            warn!("Config {} rejected ({}), using defaults", store.path().display(), e);
            NodeConfig::default()
        }
    };
    let mode = config.indicator_mode().map_err(Error::from)?;
    match mode {
        IndicatorMode::ForcedOff => info!("LED matrix: forced off"),
        IndicatorMode::DayNight(offsets) => info!(
            "LED matrix: on at {}ms, off at {}ms after midnight",
            offsets.turn_on_ms(),
            offsets.turn_off_ms()
        ),
    }

    // ── 3. Construct adapters and run ─────────────────────────
    let sink = HttpSink::new(
        config.sink_url.clone(),
        Duration::from_millis(u64::from(config.sink_timeout_ms)),
    );
    info!("Sink: POST {}", sink.url());

    match config.hardware {
        HardwareKind::SenseHat => {
            let sensors = IioSensors::new(&config.iio_root);
            let matrix = LedMatrix::new(&config.framebuffer, config.led_colour);
            serve(mode, SystemClock::new(), sensors, matrix, sink)
        }
        HardwareKind::Simulated => {
            warn!("Running on simulated hardware");
            serve(mode, SystemClock::new(), SimulatedSensors::new(), SimulatedMatrix::new(), sink)
        }
    }
}

/// Block on the node until startup fails.
fn serve<C, S, I>(mode: IndicatorMode, clock: C, sensors: S, indicator: I, sink: HttpSink) -> Result<()>
where
    C: ClockPort,
    S: SensorPort,
    I: IndicatorPort,
{
    let mut node = Node::new(mode, clock, sensors, indicator, sink, LogEventSink::new());
    match future::block_on(run(&mut node)) {
        Ok(never) => match never {},
        Err(e) => Err(anyhow::anyhow!("node stopped: {e}")),
    }
}
