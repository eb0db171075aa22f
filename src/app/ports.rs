//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RoverService (domain)
//! ```
//!
//! Driven adapters (motor driver, event sinks, config storage) implement
//! these traits.  The [`RoverService`](super::service::RoverService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use embedded_hal::digital::PinState;

use crate::config::RoverConfig;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the motor shield, addressed by logical pin number
/// (see [`pins`](crate::pins)).
///
/// Writes are fire-and-forget: implementations log and swallow hardware
/// errors rather than feeding them back into the decision path.
pub trait ActuatorPort {
    /// Drive a direction pin.
    fn set_digital(&mut self, pin: u8, state: PinState);

    /// Set channel power, 0 (off) to 255 (full).
    fn set_analog(&mut self, pin: u8, value: u8);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / status)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the controller configuration.
///
/// Implementations MUST validate before persisting.  Invalid values are
/// rejected with [`ConfigError::ValidationFailed`], never clamped.
pub trait ConfigPort {
    /// Returns [`RoverConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<RoverConfig, ConfigError>;

    fn save(&mut self, config: &RoverConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::NotFound => Self::Config("not found"),
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::IoError => Self::Config("storage I/O error"),
        }
    }
}
