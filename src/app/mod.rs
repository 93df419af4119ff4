//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the orchestration rules for the sensor node:
//! readiness, minute-aligned polling, and the day/night indicator loop.
//! All interaction with hardware, the network, and the wall clock happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod reading;
pub mod service;
