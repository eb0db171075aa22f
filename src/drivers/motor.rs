//! DC drive motor channel (one side of the dual H-bridge shield).
//!
//! Power via an 8-bit LEDC PWM channel, direction via a digital GPIO.
//! The driver is a dumb actuator: it does not stop before reversing, that
//! ordering is part of each drive command's pin pattern.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real PWM and GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use embedded_hal::digital::PinState;

use crate::drivers::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorState {
    /// 0 = unpowered, 255 = full.
    pub power: u8,
    /// Direction pin level; low is forward.
    pub direction: PinState,
}

pub struct MotorChannel {
    dir_gpio: i32,
    ledc_channel: u32,
    state: MotorState,
}

impl MotorChannel {
    pub fn new(dir_gpio: i32, ledc_channel: u32) -> Self {
        Self {
            dir_gpio,
            ledc_channel,
            state: MotorState {
                power: 0,
                direction: PinState::Low,
            },
        }
    }

    pub fn set_direction(&mut self, direction: PinState) {
        hw_init::gpio_write(self.dir_gpio, direction == PinState::High);
        self.state.direction = direction;
    }

    pub fn set_power(&mut self, power: u8) {
        hw_init::ledc_set(self.ledc_channel, power);
        self.state.power = power;
    }

    pub fn stop(&mut self) {
        self.set_power(0);
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.power > 0
    }
}
