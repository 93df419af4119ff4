//! Simulated hardware for development hosts.
//!
//! Stands in for the Sense HAT when `hardware = "simulated"`: both
//! subsystems are ready immediately, readings drift slowly around
//! room conditions, and the matrix only logs what it would show.

use log::info;

use crate::app::ports::{IndicatorPort, SensorPort};
use crate::app::reading::SensorReading;
use crate::error::{IndicatorError, SensorError};

/// Deterministic synthetic sensors.
#[derive(Debug, Default)]
pub struct SimulatedSensors {
    samples: u32,
}

impl SimulatedSensors {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SensorPort for SimulatedSensors {
    async fn ready(&self) {}

    async fn read(&mut self) -> Result<SensorReading, SensorError> {
        // One slow sine period per simulated day of minute samples.
        let phase = f64::from(self.samples % 1440) / 1440.0 * core::f64::consts::TAU;
        self.samples = self.samples.wrapping_add(1);
        let t = 21.0 + 2.5 * phase.sin();
        Ok(SensorReading {
            temperature_from_pressure: t - 0.2,
            temperature_from_humidity: t + 0.2,
            pressure: 1013.0 + 4.0 * phase.cos(),
            humidity: 45.0 - 8.0 * phase.sin(),
        })
    }
}

/// Log-only LED matrix.
#[derive(Debug, Default)]
pub struct SimulatedMatrix {
    lit: bool,
}

impl SimulatedMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl IndicatorPort for SimulatedMatrix {
    async fn ready(&self) {}

    async fn turn_on(&mut self) -> Result<(), IndicatorError> {
        self.lit = true;
        info!("SIM | matrix lit");
        Ok(())
    }

    async fn turn_off(&mut self) -> Result<(), IndicatorError> {
        self.lit = false;
        info!("SIM | matrix blank");
        Ok(())
    }
}
