//! Outbound application events.
//!
//! The [`RoverService`](super::service::RoverService) and the read loop
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them: log to serial,
//! drive a status LED, and so on.

use crate::control::drive::{Command, DriveMode};
use crate::error::TransportError;
use crate::telemetry::parser::LabeledSample;

/// Longest excerpt of a read carried in [`AppEvent::FrameReceived`].
pub const FRAME_TEXT_CAP: usize = 64;

/// Lossy, truncated text of one read.
pub type FrameText = heapless::String<FRAME_TEXT_CAP>;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The read loop has started.
    Started,

    /// A read returned `bytes` bytes of telemetry; `text` is the start of
    /// it, decoded lossily.
    FrameReceived { bytes: usize, text: FrameText },

    /// A field parsed into a sample, before calibration and decisions.
    SampleParsed(LabeledSample),

    /// A baseline orientation was captured.
    BaselineCaptured { yaw: f64, pitch: f64 },

    /// A drive command was written to the actuator.  `repeat` is set when
    /// it is the same command as last time.
    CommandIssued {
        command: Command,
        mode: DriveMode,
        repeat: bool,
    },

    /// Calibration was cleared on request.
    Recalibrated,

    /// A new configuration was applied.
    ConfigUpdated,

    /// A configuration update was refused.
    ConfigRejected(&'static str),

    /// The transport failed; the read loop is terminating.
    TransportFault(TransportError),

    /// The read loop has stopped (after cancellation or a fault).
    Stopped,
}

impl AppEvent {
    /// `FrameReceived` for one raw read.  Invalid UTF-8 becomes U+FFFD and
    /// the text stops at the last whole character that fits.
    pub fn frame_received(data: &[u8]) -> Self {
        let mut text = FrameText::new();
        for c in String::from_utf8_lossy(data).chars() {
            if text.push(c).is_err() {
                break;
            }
        }
        Self::FrameReceived {
            bytes: data.len(),
            text,
        }
    }
}
