//! Controller configuration parameters
//!
//! All tunable parameters for the Tiltdrive controller.  Defaults reproduce
//! the thresholds the rover was tuned with; values can be overridden from
//! the persisted config blob (see [`ConfigPort`](crate::app::ports::ConfigPort)).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RoverConfig {
    pub parser: ParserConfig,
    pub calibration: CalibrationConfig,
    pub navigation: NavigationConfig,
    pub link: LinkConfig,
}

/// Telemetry field parser options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Keep an unterminated trailing field and complete it with the next
    /// read.  `false` drops it every call (legacy behaviour).
    pub carry_partial_fields: bool,
    /// Treat a reading of exactly 0.0 as "no new data".
    pub suppress_zero_readings: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            carry_partial_fields: true,
            suppress_zero_readings: true,
        }
    }
}

/// Movement needed (degrees, against the last committed reading) before
/// the baseline orientation is captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub yaw_trigger_deg: f64,
    pub pitch_trigger_deg: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            yaw_trigger_deg: 20.0,
            pitch_trigger_deg: 50.0,
        }
    }
}

/// Hysteresis bands for the decision engine, in degrees from the baseline.
///
/// ```text
///  yaw   |0 ──── hold ────┤ dead band ├──── turn ──── ...
///  pitch |0 ── stop ──┤ . ├── forward ──┤ . . ├── reverse ── ...
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Yaw deviation at or beyond which the rover turns.
    pub turn_deg: f64,
    /// Yaw deviation at or below which pitch commands are honoured.
    pub heading_hold_deg: f64,
    /// Pitch deviation at or below which the rover stops.
    pub stop_deg: f64,
    /// Inclusive pitch band that drives forward.
    pub forward_min_deg: f64,
    pub forward_max_deg: f64,
    /// Pitch deviation at or beyond which the rover reverses.
    pub reverse_deg: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            turn_deg: 75.0,
            heading_hold_deg: 35.0,
            stop_deg: 40.0,
            forward_min_deg: 50.0,
            forward_max_deg: 60.0,
            reverse_deg: 90.0,
        }
    }
}

/// Telemetry link settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// UART peripheral number carrying the telemetry stream.
    pub uart_port: u8,
    pub baud_rate: u32,
    /// Upper bound for a single partial read.
    pub read_chunk_bytes: u16,
    /// Pause after an empty read before asking again (0 = just yield).
    pub idle_backoff_ms: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            uart_port: 1,
            baud_rate: 9600,
            read_chunk_bytes: 1024,
            idle_backoff_ms: 5,
        }
    }
}

impl RoverConfig {
    /// Range-check every field.  Invalid configs are rejected, never
    /// clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cal = &self.calibration;
        if !(cal.yaw_trigger_deg > 0.0 && cal.yaw_trigger_deg < 360.0) {
            return Err(ConfigError::ValidationFailed("yaw_trigger_deg must be in (0, 360)"));
        }
        if !(cal.pitch_trigger_deg > 0.0 && cal.pitch_trigger_deg < 360.0) {
            return Err(ConfigError::ValidationFailed("pitch_trigger_deg must be in (0, 360)"));
        }

        let nav = &self.navigation;
        let bands = [
            nav.turn_deg,
            nav.heading_hold_deg,
            nav.stop_deg,
            nav.forward_min_deg,
            nav.forward_max_deg,
            nav.reverse_deg,
        ];
        if bands.iter().any(|b| !b.is_finite() || *b < 0.0) {
            return Err(ConfigError::ValidationFailed("navigation bands must be finite and >= 0"));
        }
        if nav.heading_hold_deg >= nav.turn_deg {
            return Err(ConfigError::ValidationFailed("heading_hold_deg must be below turn_deg"));
        }
        if nav.stop_deg >= nav.forward_min_deg {
            return Err(ConfigError::ValidationFailed("stop_deg must be below forward_min_deg"));
        }
        if nav.forward_min_deg > nav.forward_max_deg {
            return Err(ConfigError::ValidationFailed("forward band is inverted"));
        }
        if nav.forward_max_deg >= nav.reverse_deg {
            return Err(ConfigError::ValidationFailed("forward_max_deg must be below reverse_deg"));
        }

        let link = &self.link;
        if link.baud_rate == 0 {
            return Err(ConfigError::ValidationFailed("baud_rate must be non-zero"));
        }
        if !(16..=1024).contains(&link.read_chunk_bytes) {
            return Err(ConfigError::ValidationFailed("read_chunk_bytes must be in 16..=1024"));
        }
        Ok(())
    }
}
