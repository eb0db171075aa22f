//! Orientation tracking and runtime calibration.
//!
//! The tracker is the only owner of [`OrientationState`].  Every accepted
//! sample goes through [`OrientationTracker::update`], which
//!
//! 1. captures the baseline on the first significant movement,
//! 2. unwraps the yaw reading across the 360°/0° seam relative to the
//!    baseline,
//! 3. commits the raw reading as the axis' new current value.
//!
//! ```text
//!  UNCALIBRATED ──[|Δyaw| ≥ 20° or |Δpitch| ≥ 50°]──▶ CALIBRATED
//!        ▲                                                │
//!        └───────────────────[recalibrate]────────────────┘
//! ```

use log::{debug, info};

use crate::config::CalibrationConfig;
use crate::telemetry::parser::{Axis, LabeledSample};

use super::drive::DriveMode;

/// Readings per axis, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisState {
    pub current: f64,
    pub previous: f64,
    pub reference: f64,
}

impl AxisState {
    fn commit(&mut self, value: f64) {
        self.previous = self.current;
        self.current = value;
    }
}

/// Whether a baseline orientation has been captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationState {
    #[default]
    Uncalibrated,
    Calibrated,
}

/// Everything the controller knows about the operator's orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrientationState {
    /// Yaw.
    pub x: AxisState,
    /// Pitch.
    pub y: AxisState,
    /// Roll (tracked, not used for decisions).
    pub z: AxisState,
    pub calibration: CalibrationState,
    pub drive_mode: DriveMode,
}

impl OrientationState {
    pub fn is_calibrated(&self) -> bool {
        self.calibration == CalibrationState::Calibrated
    }

    pub fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

/// Result of feeding one sample to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleDelta {
    pub axis: Axis,
    /// The reading as received.
    pub raw: f64,
    /// The reading after seam correction (equal to `raw` except for yaw
    /// near the 360°/0° boundary).
    pub corrected: f64,
    /// This sample captured the baseline.
    pub calibration_triggered: bool,
}

impl AngleDelta {
    /// Absolute deviation of the corrected reading from `reference`.
    pub fn deviation_from(&self, reference: f64) -> f64 {
        (self.corrected - reference).abs()
    }
}

/// Owns the orientation state and applies the calibration procedure.
pub struct OrientationTracker {
    state: OrientationState,
    config: CalibrationConfig,
}

impl OrientationTracker {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            state: OrientationState::default(),
            config,
        }
    }

    /// Read-only snapshot for the decision engine.
    pub fn state(&self) -> &OrientationState {
        &self.state
    }

    pub fn is_calibrated(&self) -> bool {
        self.state.is_calibrated()
    }

    pub fn drive_mode(&self) -> DriveMode {
        self.state.drive_mode
    }

    pub fn set_drive_mode(&mut self, mode: DriveMode) {
        self.state.drive_mode = mode;
    }

    pub fn set_config(&mut self, config: CalibrationConfig) {
        self.config = config;
    }

    /// Process one sample.
    pub fn update(&mut self, sample: LabeledSample) -> AngleDelta {
        let value = sample.value;
        let committed = self.state.axis(sample.axis).current;

        let calibration_triggered = match self.trigger_threshold(sample.axis) {
            Some(threshold) if !self.is_calibrated() => {
                if (value - committed).abs() >= threshold {
                    self.capture_baseline();
                    true
                } else {
                    false
                }
            }
            _ => false,
        };

        let corrected = if sample.axis == Axis::X && self.is_calibrated() {
            unwrap_yaw(value, self.state.x.reference)
        } else {
            value
        };

        self.state.axis_mut(sample.axis).commit(value);

        debug!(
            "tracker: {:?} raw={:.2} corrected={:.2}{}",
            sample.axis,
            value,
            corrected,
            if calibration_triggered { " (baseline captured)" } else { "" }
        );

        AngleDelta {
            axis: sample.axis,
            raw: value,
            corrected,
            calibration_triggered,
        }
    }

    /// Drop the calibration so the next significant movement captures a
    /// fresh baseline.
    ///
    /// Only the pitch and roll references are zeroed; the yaw reference is
    /// kept until the next capture overwrites it.
    pub fn recalibrate(&mut self) {
        self.state.calibration = CalibrationState::Uncalibrated;
        self.state.y.reference = 0.0;
        self.state.z.reference = 0.0;
        info!("tracker: calibration cleared, waiting for movement");
    }

    /// Freeze the last committed yaw and pitch as the baseline.
    fn capture_baseline(&mut self) {
        self.state.x.reference = self.state.x.current;
        self.state.y.reference = self.state.y.current;
        self.state.calibration = CalibrationState::Calibrated;
        info!(
            "tracker: baseline captured (yaw={:.1}, pitch={:.1})",
            self.state.x.reference, self.state.y.reference
        );
    }

    fn trigger_threshold(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::X => Some(self.config.yaw_trigger_deg),
            Axis::Y => Some(self.config.pitch_trigger_deg),
            Axis::Z => None,
        }
    }
}

/// Re-express `yaw` on the same side of the 360°/0° seam as `reference`.
///
/// Only readings within a quarter turn of the seam on the opposite side are
/// shifted; everything else is returned unchanged.
pub fn unwrap_yaw(yaw: f64, reference: f64) -> f64 {
    let high = |a: f64| (270.0..=360.0).contains(&a);
    let low = |a: f64| (0.0..=90.0).contains(&a);

    if high(yaw) && low(reference) {
        yaw - 360.0
    } else if low(yaw) && high(reference) {
        yaw + 360.0
    } else {
        yaw
    }
}
