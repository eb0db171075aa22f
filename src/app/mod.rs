//! Application core: pure domain logic, zero I/O.
//!
//! Business rules for the rover: calibration, navigation decisions and
//! command application.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
