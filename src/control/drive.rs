//! Drive commands and the pin-write pattern each one expands to.
//!
//! ```text
//!            ┌──────── DriveForward ────────┐
//!            ▼                              │
//!        FORWARD ───────── Reverse ───────▶ REVERSING
//!   (dir pins LOW)                      (dir pins HIGH)
//!
//!  Stop / TurnLeft / TurnRight only touch the power pins
//!  and leave the drive mode as it is.
//! ```
//!
//! A mode change always cuts power first so the H-bridges never flip
//! direction under load.

use embedded_hal::digital::PinState;
use heapless::Vec;

use crate::pins::{
    LEFT_DIR_PIN, LEFT_POWER_PIN, POWER_MAX, POWER_OFF, RIGHT_DIR_PIN, RIGHT_POWER_PIN,
};

/// Longest pattern: stop (2) + direction (2) + power (2).
pub const MAX_PIN_WRITES: usize = 6;

/// Discrete drive command produced by the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Cut power on both channels; direction pins untouched.
    Stop,
    /// Both channels full power, direction pins low.
    DriveForward,
    /// Left channel full, right channel off.
    TurnLeft,
    /// Right channel full, left channel off.
    TurnRight,
    /// Both channels full power, direction pins high.
    Reverse,
}

impl Command {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::DriveForward => "forward",
            Self::TurnLeft => "left",
            Self::TurnRight => "right",
            Self::Reverse => "reverse",
        }
    }

    /// Drive mode after this command has been applied in `mode`.
    pub const fn next_mode(self, mode: DriveMode) -> DriveMode {
        match self {
            Self::DriveForward => DriveMode::Forward,
            Self::Reverse => DriveMode::Reversing,
            Self::Stop | Self::TurnLeft | Self::TurnRight => mode,
        }
    }

    /// Pin writes that realise this command when issued in `mode`.
    pub fn pin_writes(self, mode: DriveMode) -> Vec<PinWrite, MAX_PIN_WRITES> {
        let mut out = Vec::new();
        // Capacity is MAX_PIN_WRITES and no pattern exceeds it.
        let mut push = |w: PinWrite| {
            let _ = out.push(w);
        };

        match self {
            Self::Stop => {
                push(PinWrite::Analog(LEFT_POWER_PIN, POWER_OFF));
                push(PinWrite::Analog(RIGHT_POWER_PIN, POWER_OFF));
            }
            Self::TurnLeft => {
                push(PinWrite::Analog(LEFT_POWER_PIN, POWER_MAX));
                push(PinWrite::Analog(RIGHT_POWER_PIN, POWER_OFF));
            }
            Self::TurnRight => {
                push(PinWrite::Analog(LEFT_POWER_PIN, POWER_OFF));
                push(PinWrite::Analog(RIGHT_POWER_PIN, POWER_MAX));
            }
            Self::DriveForward | Self::Reverse => {
                let (level, switching) = if self == Self::DriveForward {
                    (PinState::Low, mode == DriveMode::Reversing)
                } else {
                    (PinState::High, mode == DriveMode::Forward)
                };
                if switching {
                    push(PinWrite::Analog(LEFT_POWER_PIN, POWER_OFF));
                    push(PinWrite::Analog(RIGHT_POWER_PIN, POWER_OFF));
                }
                push(PinWrite::Digital(LEFT_DIR_PIN, level));
                push(PinWrite::Digital(RIGHT_DIR_PIN, level));
                push(PinWrite::Analog(LEFT_POWER_PIN, POWER_MAX));
                push(PinWrite::Analog(RIGHT_POWER_PIN, POWER_MAX));
            }
        }
        out
    }
}

/// Which way the H-bridges are currently set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriveMode {
    #[default]
    Forward,
    Reversing,
}

impl DriveMode {
    pub const fn is_reversing(self) -> bool {
        matches!(self, Self::Reversing)
    }
}

/// One write to the actuator, in logical pin numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinWrite {
    Digital(u8, PinState),
    Analog(u8, u8),
}
