//! Decision engine: calibrated orientation in, at most one drive command out.
//!
//! Rules, in priority order, evaluated only once a baseline exists:
//!
//! | Sample | Guard                                             | Command          |
//! |--------|---------------------------------------------------|------------------|
//! | yaw    | `Δyaw ≥ turn`                                     | TurnLeft / Right |
//! | yaw    | `Δyaw ≤ hold` and `forward_min ≤ Δpitch ≤ forward_max` | DriveForward |
//! | yaw    | `Δyaw ≤ hold` and `Δpitch ≥ reverse`              | Reverse          |
//! | pitch  | `Δpitch ≤ stop`                                   | Stop             |
//!
//! Deviations are absolute distances from the baseline.  Readings that fall
//! between bands produce nothing and the rover keeps its last command; the
//! gaps between bands are what keeps it from chattering.

use crate::config::NavigationConfig;
use crate::telemetry::parser::Axis;

use super::drive::Command;
use super::orientation::{AngleDelta, OrientationState};

pub struct NavigationEngine {
    bands: NavigationConfig,
}

impl NavigationEngine {
    pub fn new(bands: NavigationConfig) -> Self {
        Self { bands }
    }

    pub fn set_bands(&mut self, bands: NavigationConfig) {
        self.bands = bands;
    }

    /// Decide on the sample just committed by the tracker.
    ///
    /// `state` must be the snapshot taken after `delta` was applied, so the
    /// pitch used for yaw decisions is the latest one received.
    pub fn decide(&self, delta: &AngleDelta, state: &OrientationState) -> Option<Command> {
        if !state.is_calibrated() {
            return None;
        }
        match delta.axis {
            Axis::X => self.decide_yaw(delta, state),
            Axis::Y => self.decide_pitch(delta, state),
            Axis::Z => None,
        }
    }

    fn decide_yaw(&self, delta: &AngleDelta, state: &OrientationState) -> Option<Command> {
        let b = &self.bands;
        let reference = state.x.reference;
        let yaw_dev = delta.deviation_from(reference);
        let pitch_dev = (state.y.current - state.y.reference).abs();

        if yaw_dev >= b.turn_deg {
            return if delta.corrected > reference {
                Some(Command::TurnLeft)
            } else {
                Some(Command::TurnRight)
            };
        }
        if yaw_dev > b.heading_hold_deg {
            return None;
        }
        if (b.forward_min_deg..=b.forward_max_deg).contains(&pitch_dev) {
            Some(Command::DriveForward)
        } else if pitch_dev >= b.reverse_deg {
            Some(Command::Reverse)
        } else {
            None
        }
    }

    fn decide_pitch(&self, delta: &AngleDelta, state: &OrientationState) -> Option<Command> {
        let pitch_dev = delta.deviation_from(state.y.reference);
        (pitch_dev <= self.bands.stop_deg).then_some(Command::Stop)
    }
}
