//! Pin assignments for the Tiltdrive motor board.
//!
//! Two numbering schemes live here:
//!
//! - **Logical actuator pins**: the numbers the drive commands are
//!   expressed in (`1`/`6` enable+direction, `2`/`3` channel power).  They
//!   match the header labels on the motor shield and are what
//!   [`ActuatorPort`](crate::app::ports::ActuatorPort) receives.
//! - **ESP32 GPIOs**: where those logical pins are wired on the
//!   controller board.  Only [`MotorAdapter`](crate::adapters::motor::MotorAdapter)
//!   and the drivers translate between the two.

// ---------------------------------------------------------------------------
// Logical actuator pins (motor shield header)
// ---------------------------------------------------------------------------

/// Enable/direction input of the left drive channel.
pub const LEFT_DIR_PIN: u8 = 1;
/// Enable/direction input of the right drive channel.
pub const RIGHT_DIR_PIN: u8 = 6;
/// PWM power input of the left drive channel.
pub const LEFT_POWER_PIN: u8 = 2;
/// PWM power input of the right drive channel.
pub const RIGHT_POWER_PIN: u8 = 3;

/// Full power on a drive channel.
pub const POWER_MAX: u8 = 255;
/// Channel unpowered.
pub const POWER_OFF: u8 = 0;

// ---------------------------------------------------------------------------
// ESP32 wiring
// ---------------------------------------------------------------------------

/// Direction GPIO for the left H-bridge (shield pin 1).
pub const LEFT_DIR_GPIO: i32 = 4;
/// Direction GPIO for the right H-bridge (shield pin 6).
pub const RIGHT_DIR_GPIO: i32 = 5;
/// LEDC PWM output for the left H-bridge (shield pin 2).
pub const LEFT_PWM_GPIO: i32 = 6;
/// LEDC PWM output for the right H-bridge (shield pin 3).
pub const RIGHT_PWM_GPIO: i32 = 7;

/// Motor PWM carrier frequency.
pub const MOTOR_PWM_FREQ_HZ: u32 = 20_000;

/// UART RX carrying the orientation telemetry from the IMU module.
pub const TELEMETRY_RX_GPIO: i32 = 18;
/// UART TX towards the IMU module (unused by the protocol, wired anyway).
pub const TELEMETRY_TX_GPIO: i32 = 17;

/// Recalibration push button (active low, internal pull-up).
pub const CALIBRATE_BUTTON_GPIO: i32 = 0;
