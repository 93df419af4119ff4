//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters and a virtual clock.  No hardware, network or
//! real waiting is involved.

mod day_night_tests;
mod node_tests;
mod poll_tests;
