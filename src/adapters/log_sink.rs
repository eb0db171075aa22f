//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART0 / USB-CDC in production).

use log::{debug, info, trace, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | waiting for telemetry");
            }
            AppEvent::FrameReceived { bytes, text } => {
                trace!("RX    | {} bytes {:?}", bytes, text.as_str());
            }
            AppEvent::SampleParsed(sample) => {
                trace!("RX    | {}: {:.2}", sample.axis.tag(), sample.value);
            }
            AppEvent::BaselineCaptured { yaw, pitch } => {
                info!("CAL   | baseline yaw={:.1}\u{00b0} pitch={:.1}\u{00b0}", yaw, pitch);
            }
            AppEvent::CommandIssued { command, mode, repeat } => {
                if *repeat {
                    debug!("CMD   | {} (mode={:?}, repeat)", command.name(), mode);
                } else {
                    info!("CMD   | {} (mode={:?})", command.name(), mode);
                }
            }
            AppEvent::Recalibrated => {
                info!("CAL   | cleared, waiting for movement");
            }
            AppEvent::ConfigUpdated => {
                info!("CFG   | updated");
            }
            AppEvent::ConfigRejected(reason) => {
                warn!("CFG   | rejected: {}", reason);
            }
            AppEvent::TransportFault(e) => {
                warn!("LINK  | fault: {}", e);
            }
            AppEvent::Stopped => {
                info!("STOP  | read loop exited");
            }
        }
    }
}
