//! Unified error types for the Tiltdrive controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! read loop's error handling uniform.  All variants are `Copy` so they can
//! be passed through the event sink and returned from the loop without
//! allocation.
//!
//! Parse-level problems are deliberately absent: a field that is not a
//! valid sample is skipped inside the parser and only shows up in its
//! statistics.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The telemetry transport failed (fatal to the read loop).
    Transport(TransportError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`Transport`](crate::telemetry::transport::Transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The read was aborted on request.  Not a failure: the read loop
    /// treats it as a clean shutdown trigger.
    Cancelled,
    /// The peer closed the stream or the port was released.
    Closed,
    /// Any other I/O failure.  Transient and fatal errors are not
    /// distinguished; both terminate the read loop.
    Io(std::io::ErrorKind),
    /// Driver-level failure carrying the raw platform return code.
    Driver(i32),
}

impl TransportError {
    /// `true` for the one variant that must not be reported as a failure.
    pub const fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "read cancelled"),
            Self::Closed => write!(f, "stream closed"),
            Self::Io(kind) => write!(f, "I/O error ({kind})"),
            Self::Driver(rc) => write!(f, "driver error (rc={rc})"),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::BrokenPipe => Self::Closed,
            kind => Self::Io(kind),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
