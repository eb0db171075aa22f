//! Tiltdrive controller library.
//!
//! Steers a two-motor rover from a head- or hand-mounted orientation
//! sensor: telemetry text in, motor pin writes out.  Everything except
//! the peripheral helpers in [`drivers::hw_init`] is plain Rust and runs
//! on the host; ESP-IDF code is guarded by the `espidf` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod telemetry;
