//! Motor adapter: bridges the dual H-bridge shield to [`ActuatorPort`].
//!
//! Translates the logical shield pins the drive commands are written in
//! into calls on the two [`MotorChannel`] drivers.  This is the only place
//! in the system that knows which logical pin drives which channel.  On
//! non-espidf targets, the underlying drivers use simulation stubs.

use embedded_hal::digital::PinState;
use log::warn;

use crate::app::ports::ActuatorPort;
use crate::drivers::hw_init::{LEDC_CH_LEFT, LEDC_CH_RIGHT};
use crate::drivers::motor::{MotorChannel, MotorState};
use crate::pins;

/// Concrete adapter owning both drive channels.
pub struct MotorAdapter {
    left: MotorChannel,
    right: MotorChannel,
}

impl MotorAdapter {
    pub fn new(left: MotorChannel, right: MotorChannel) -> Self {
        Self { left, right }
    }

    /// Channels wired as described in [`pins`].
    pub fn with_board_wiring() -> Self {
        Self::new(
            MotorChannel::new(pins::LEFT_DIR_GPIO, LEDC_CH_LEFT),
            MotorChannel::new(pins::RIGHT_DIR_GPIO, LEDC_CH_RIGHT),
        )
    }

    pub fn left(&self) -> MotorState {
        self.left.state()
    }

    pub fn right(&self) -> MotorState {
        self.right.state()
    }

    /// Cut power on both channels (shutdown path).
    pub fn all_off(&mut self) {
        self.left.stop();
        self.right.stop();
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for MotorAdapter {
    fn set_digital(&mut self, pin: u8, state: PinState) {
        match pin {
            pins::LEFT_DIR_PIN => self.left.set_direction(state),
            pins::RIGHT_DIR_PIN => self.right.set_direction(state),
            other => warn!("motor: digital write to unmapped pin {}", other),
        }
    }

    fn set_analog(&mut self, pin: u8, value: u8) {
        match pin {
            pins::LEFT_POWER_PIN => self.left.set_power(value),
            pins::RIGHT_POWER_PIN => self.right.set_power(value),
            other => warn!("motor: analog write to unmapped pin {}", other),
        }
    }
}
