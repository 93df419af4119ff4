//! SenseNode library.
//!
//! Exposes the scheduling core, the port traits and every adapter for
//! integration testing.  The binary in `main.rs` only wires them up.

#![deny(unused_must_use)]

// Links the std time driver that `async_io_mini::Timer` runs on.
use embassy_time as _;

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod readiness;
pub mod scheduler;
