//! Sense HAT adapters.
//!
//! The kernel already drives the board: the LPS25H (pressure) and HTS221
//! (humidity) sensors appear as Linux IIO devices, the 8×8 LED matrix as a
//! framebuffer.  These adapters only read scaled channel values from sysfs
//! and write whole frames; there is no bus protocol or pixel rendering here.
//!
//! | Adapter         | Implements      | Connects to                      |
//! |-----------------|-----------------|----------------------------------|
//! | `IioSensors`    | SensorPort      | `/sys/bus/iio/devices/*`         |
//! | `LedMatrix`     | IndicatorPort   | `/dev/fbN` (RGB565, 8×8)         |

use core::time::Duration;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{IndicatorPort, SensorPort};
use crate::app::reading::SensorReading;
use crate::error::{IndicatorError, SensorError};

/// IIO `name` of the pressure sensor.
const PRESSURE_DEVICE: &str = "lps25h";
/// IIO `name` of the humidity sensor.
const HUMIDITY_DEVICE: &str = "hts221";

/// How often `ready()` re-probes for missing devices.
const PROBE_INTERVAL: Duration = Duration::from_secs(2);

/// Matrix geometry.
const MATRIX_PIXELS: usize = 8 * 8;

// ───────────────────────────────────────────────────────────────
// Sensors (IIO)
// ───────────────────────────────────────────────────────────────

/// Pressure + humidity sensors read through the IIO sysfs interface.
pub struct IioSensors {
    root: PathBuf,
}

impl IioSensors {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Device directory whose `name` attribute equals `name`.
    fn find_device(&self, name: &str) -> Option<PathBuf> {
        std::fs::read_dir(&self.root)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|dir| {
                std::fs::read_to_string(dir.join("name")).is_ok_and(|n| n.trim() == name)
            })
    }
}

impl SensorPort for IioSensors {
    async fn ready(&self) {
        let mut warned = false;
        loop {
            let pressure = self.find_device(PRESSURE_DEVICE);
            let humidity = self.find_device(HUMIDITY_DEVICE);
            if let (Some(p), Some(h)) = (&pressure, &humidity) {
                info!("IIO: {} at {}, {} at {}", PRESSURE_DEVICE, p.display(), HUMIDITY_DEVICE, h.display());
                return;
            }
            if !warned {
                warn!(
                    "IIO: waiting for {} / {} under {}",
                    PRESSURE_DEVICE,
                    HUMIDITY_DEVICE,
                    self.root.display()
                );
                warned = true;
            }
            async_io_mini::Timer::after(PROBE_INTERVAL).await;
        }
    }

    async fn read(&mut self) -> Result<SensorReading, SensorError> {
        let pressure_dev = self.find_device(PRESSURE_DEVICE).ok_or(SensorError::DeviceNotFound)?;
        let humidity_dev = self.find_device(HUMIDITY_DEVICE).ok_or(SensorError::DeviceNotFound)?;

        // IIO units: pressure kPa, temperature m°C, relative humidity m%.
        let reading = SensorReading {
            temperature_from_pressure: read_channel(&pressure_dev, "temp")? / 1000.0,
            temperature_from_humidity: read_channel(&humidity_dev, "temp")? / 1000.0,
            pressure: read_channel(&pressure_dev, "pressure")? * 10.0,
            humidity: read_channel(&humidity_dev, "humidityrelative")? / 1000.0,
        };
        check_plausible(&reading)?;
        Ok(reading)
    }
}

/// `(raw + offset) * scale`, with a processed `_input` attribute preferred
/// when the driver exposes one.
fn read_channel(dev: &Path, channel: &str) -> Result<f64, SensorError> {
    if let Some(value) = read_attr(dev, &format!("in_{channel}_input"))? {
        return Ok(value);
    }
    let raw = read_attr(dev, &format!("in_{channel}_raw"))?.ok_or(SensorError::ReadFailed)?;
    let offset = read_attr(dev, &format!("in_{channel}_offset"))?.unwrap_or(0.0);
    let scale = read_attr(dev, &format!("in_{channel}_scale"))?.unwrap_or(1.0);
    Ok((raw + offset) * scale)
}

/// `Ok(None)` when the attribute does not exist.
fn read_attr(dev: &Path, attr: &str) -> Result<Option<f64>, SensorError> {
    match std::fs::read_to_string(dev.join(attr)) {
        Ok(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SensorError::InvalidData),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(_) => Err(SensorError::ReadFailed),
    }
}

fn check_plausible(r: &SensorReading) -> Result<(), SensorError> {
    let temps_ok = [r.temperature_from_pressure, r.temperature_from_humidity]
        .iter()
        .all(|t| (-40.0..=120.0).contains(t));
    // LPS25H measures 260–1260 hPa.
    let pressure_ok = (260.0..=1260.0).contains(&r.pressure);
    let humidity_ok = (0.0..=100.0).contains(&r.humidity);
    if temps_ok && pressure_ok && humidity_ok {
        Ok(())
    } else {
        Err(SensorError::OutOfRange)
    }
}

// ───────────────────────────────────────────────────────────────
// LED matrix (framebuffer)
// ───────────────────────────────────────────────────────────────

/// 8×8 RGB565 matrix, lit in a single colour or blanked.
pub struct LedMatrix {
    device: PathBuf,
    lit: [u8; MATRIX_PIXELS * 2],
}

impl LedMatrix {
    pub fn new(device: impl Into<PathBuf>, colour: [u8; 3]) -> Self {
        let [lo, hi] = rgb565(colour).to_le_bytes();
        let mut lit = [0u8; MATRIX_PIXELS * 2];
        for px in lit.chunks_exact_mut(2) {
            px[0] = lo;
            px[1] = hi;
        }
        Self {
            device: device.into(),
            lit,
        }
    }

    fn write_frame(&self, frame: &[u8]) -> Result<(), IndicatorError> {
        let mut fb = OpenOptions::new()
            .write(true)
            .open(&self.device)
            .map_err(|_| IndicatorError::DeviceUnavailable)?;
        fb.write_all(frame).map_err(|_| IndicatorError::WriteFailed)?;
        fb.flush().map_err(|_| IndicatorError::WriteFailed)
    }
}

impl IndicatorPort for LedMatrix {
    async fn ready(&self) {
        let mut warned = false;
        while OpenOptions::new().write(true).open(&self.device).is_err() {
            if !warned {
                warn!("LED: waiting for framebuffer {}", self.device.display());
                warned = true;
            }
            async_io_mini::Timer::after(PROBE_INTERVAL).await;
        }
        info!("LED: framebuffer {} open", self.device.display());
    }

    async fn turn_on(&mut self) -> Result<(), IndicatorError> {
        self.write_frame(&self.lit)
    }

    async fn turn_off(&mut self) -> Result<(), IndicatorError> {
        self.write_frame(&[0u8; MATRIX_PIXELS * 2])
    }
}

fn rgb565([r, g, b]: [u8; 3]) -> u16 {
    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3)
}
