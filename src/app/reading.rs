//! Environmental sensor sample.

use serde::{Deserialize, Serialize};

/// One sample from the pressure and humidity sensors.
///
/// Both sensors carry their own thermometer, hence two temperatures.
/// Serialises with the camelCase keys the local API expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Temperature from the pressure sensor (°C).
    pub temperature_from_pressure: f64,
    /// Temperature from the humidity sensor (°C).
    pub temperature_from_humidity: f64,
    /// Barometric pressure (hPa).
    pub pressure: f64,
    /// Relative humidity (%RH).
    pub humidity: f64,
}

impl SensorReading {
    /// Mean of both thermometers, rounded to one decimal place.
    pub fn average_temperature(&self) -> f64 {
        round_tenths((self.temperature_from_pressure + self.temperature_from_humidity) / 2.0)
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
