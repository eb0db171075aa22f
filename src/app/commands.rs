//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (calibration
//! button, operator console) that the
//! [`RoverService`](super::service::RoverService) applies between read
//! cycles.

use crate::config::RoverConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Drop the baseline; the next significant movement captures a new one.
    Recalibrate,

    /// Cut motor power immediately.
    Stop,

    /// Hot-reload configuration.  Rejected if it fails validation.
    UpdateConfig(RoverConfig),
}
