//! Debounced calibration button with short and long press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  A small polling thread
//! samples the level every few milliseconds and feeds it to
//! [`CalibrateButton::tick`], which runs the debounce + gesture state
//! machine.  No interrupt is needed at human time scales.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition              | Event        | Command       |
//! |-------------|------------------------|--------------|---------------|
//! | Short press | Release before 2 s     | `ShortPress` | `Recalibrate` |
//! | Long press  | Hold >= 2 s            | `LongPress`  | `Stop`        |

use crate::app::commands::AppCommand;

const DEBOUNCE_MS: u32 = 50;
const LONG_PRESS_MS: u32 = 2000;

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

impl ButtonEvent {
    /// The controller command this gesture requests.
    pub fn command(self) -> AppCommand {
        match self {
            Self::ShortPress => AppCommand::Recalibrate,
            Self::LongPress => AppCommand::Stop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u32 },
    Pressed { since_ms: u32 },
    /// Long press already reported; wait for release.
    Held,
}

pub struct CalibrateButton {
    gpio: i32,
    state: GestureState,
}

impl CalibrateButton {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            state: GestureState::Idle,
        }
    }

    /// GPIO pin this button is attached to.
    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Sample the hardware level and advance the state machine.
    pub fn poll(&mut self, now_ms: u32) -> Option<ButtonEvent> {
        let pressed = !crate::drivers::hw_init::gpio_read(self.gpio);
        self.tick(now_ms, pressed)
    }

    /// Advance the state machine with an explicit level (`pressed` is the
    /// debounced-to-be logical state, already inverted for active-low).
    pub fn tick(&mut self, now_ms: u32, pressed: bool) -> Option<ButtonEvent> {
        match self.state {
            GestureState::Idle => {
                if pressed {
                    self.state = GestureState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            GestureState::DebounceWait { since_ms } => {
                if !pressed {
                    // bounce
                    self.state = GestureState::Idle;
                } else if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = GestureState::Pressed { since_ms };
                }
                None
            }

            GestureState::Pressed { since_ms } => {
                let held_ms = now_ms.wrapping_sub(since_ms);
                if !pressed {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }
                if held_ms >= LONG_PRESS_MS {
                    self.state = GestureState::Held;
                    return Some(ButtonEvent::LongPress);
                }
                None
            }

            GestureState::Held => {
                if !pressed {
                    self.state = GestureState::Idle;
                }
                None
            }
        }
    }
}
