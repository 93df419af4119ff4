//! Node configuration parameters
//!
//! All tunable parameters for the sensor node.
//! Loaded from a JSON file through a [`ConfigPort`](crate::app::ports::ConfigPort);
//! every field has a default so a partial file is enough.

use serde::{Deserialize, Serialize};

use crate::app::service::IndicatorMode;
use crate::error::ConfigError;
use crate::scheduler::{MS_PER_HOUR, ScheduleOffset};

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    // --- Sink ---
    /// Local API endpoint readings are POSTed to
    pub sink_url: String,
    /// Per-request timeout for the sink (milliseconds)
    pub sink_timeout_ms: u32,

    // --- Indicator ---
    /// Day/night schedule for the LED matrix
    pub day_night: DayNightConfig,
    /// Colour of the lit matrix (RGB)
    pub led_colour: [u8; 3],

    // --- Hardware ---
    /// Which adapters drive the sensors and the matrix
    pub hardware: HardwareKind,
    /// Linux IIO device directory
    pub iio_root: String,
    /// LED matrix framebuffer device
    pub framebuffer: String,
}

/// Day/night indicator schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayNightConfig {
    /// When false the matrix is blanked at startup and left off
    pub enabled: bool,
    /// Turn-on time (milliseconds since local midnight)
    pub turn_on_offset_ms: u32,
    /// Turn-off time (milliseconds since local midnight)
    pub turn_off_offset_ms: u32,
}

/// Hardware adapter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareKind {
    /// Sense HAT: LPS25H + HTS221 through IIO, 8×8 matrix framebuffer
    SenseHat,
    /// Synthetic readings and a log-only matrix, for development hosts
    Simulated,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Sink
            sink_url: "http://localhost:8080/sensors".to_string(),
            sink_timeout_ms: 5000,

            // Indicator
            day_night: DayNightConfig::default(),
            led_colour: [255, 255, 255],

            // Hardware
            hardware: HardwareKind::SenseHat,
            iio_root: "/sys/bus/iio/devices".to_string(),
            framebuffer: "/dev/fb1".to_string(),
        }
    }
}

impl Default for DayNightConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            turn_on_offset_ms: 8 * MS_PER_HOUR,   // 08:00
            turn_off_offset_ms: 22 * MS_PER_HOUR, // 22:00
        }
    }
}

impl NodeConfig {
    /// Reject invalid values.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sink_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("sink_url is empty"));
        }
        if !self.sink_url.starts_with("http://") && !self.sink_url.starts_with("https://") {
            return Err(ConfigError::ValidationFailed("sink_url must be an http(s) URL"));
        }
        if self.sink_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("sink_timeout_ms must be positive"));
        }
        // Checked even while the schedule is disabled.
        self.day_night.offsets()?;
        Ok(())
    }

    /// The indicator mode this config selects.
    pub fn indicator_mode(&self) -> Result<IndicatorMode, ConfigError> {
        if self.day_night.enabled {
            Ok(IndicatorMode::DayNight(self.day_night.offsets()?))
        } else {
            Ok(IndicatorMode::ForcedOff)
        }
    }
}

impl DayNightConfig {
    /// Validated offsets.
    pub fn offsets(&self) -> Result<ScheduleOffset, ConfigError> {
        ScheduleOffset::new(self.turn_on_offset_ms, self.turn_off_offset_ms)
    }
}
