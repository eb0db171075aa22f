//! Application service: the hexagonal core.
//!
//! [`RoverService`] owns the orientation tracker, the decision engine and
//! the live configuration.  It exposes a hardware-agnostic API; all I/O
//! flows through port traits injected at call sites, so the whole service
//! is testable with mock adapters.
//!
//! ```text
//!  LabeledSample ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                    │      RoverService      │
//!  ActuatorPort ◀────│  Tracker · Navigation  │
//!                    └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::RoverConfig;
use crate::control::drive::{Command, DriveMode, PinWrite};
use crate::control::navigation::NavigationEngine;
use crate::control::orientation::{OrientationState, OrientationTracker};
use crate::telemetry::parser::LabeledSample;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ActuatorPort, ConfigError, EventSink};

// ───────────────────────────────────────────────────────────────
// RoverService
// ───────────────────────────────────────────────────────────────

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub samples: u64,
    pub commands_issued: u64,
    pub calibrations: u64,
}

/// Orchestrates calibration, decisions and actuation.
pub struct RoverService {
    config: RoverConfig,
    tracker: OrientationTracker,
    engine: NavigationEngine,
    last_command: Option<Command>,
    stats: ServiceStats,
}

impl RoverService {
    /// Construct the service.  `config` is expected to have been validated
    /// by whoever loaded it.
    pub fn new(config: RoverConfig) -> Self {
        let tracker = OrientationTracker::new(config.calibration.clone());
        let engine = NavigationEngine::new(config.navigation.clone());
        Self {
            config,
            tracker,
            engine,
            last_command: None,
            stats: ServiceStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "RoverService started ({})",
            if self.tracker.is_calibrated() { "calibrated" } else { "waiting for baseline" }
        );
    }

    // ── Per-sample orchestration ──────────────────────────────

    /// Run one sample through calibration and the decision engine, and
    /// apply the resulting command (if any).
    pub fn process_sample(
        &mut self,
        sample: LabeledSample,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<Command> {
        self.stats.samples += 1;
        sink.emit(&AppEvent::SampleParsed(sample));

        let delta = self.tracker.update(sample);
        if delta.calibration_triggered {
            self.stats.calibrations += 1;
            let s = self.tracker.state();
            sink.emit(&AppEvent::BaselineCaptured {
                yaw: s.x.reference,
                pitch: s.y.reference,
            });
        }

        let command = self.engine.decide(&delta, self.tracker.state())?;
        self.apply_command(command, hw, sink);
        Some(command)
    }

    /// Write `command`'s pin pattern and advance the drive mode.
    pub fn apply_command(
        &mut self,
        command: Command,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let mode = self.tracker.drive_mode();
        for write in command.pin_writes(mode) {
            match write {
                PinWrite::Digital(pin, state) => hw.set_digital(pin, state),
                PinWrite::Analog(pin, value) => hw.set_analog(pin, value),
            }
        }

        let next = command.next_mode(mode);
        self.tracker.set_drive_mode(next);
        let repeat = self.last_command == Some(command);
        self.last_command = Some(command);
        self.stats.commands_issued += 1;

        sink.emit(&AppEvent::CommandIssued {
            command,
            mode: next,
            repeat,
        });
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (calibration button, console, etc.).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Recalibrate => {
                self.tracker.recalibrate();
                sink.emit(&AppEvent::Recalibrated);
            }
            AppCommand::Stop => {
                self.apply_command(Command::Stop, hw, sink);
            }
            AppCommand::UpdateConfig(new_config) => match self.check_update(&new_config) {
                Ok(()) => {
                    self.tracker.set_config(new_config.calibration.clone());
                    self.engine.set_bands(new_config.navigation.clone());
                    self.config = new_config;
                    sink.emit(&AppEvent::ConfigUpdated);
                    info!("Configuration updated at runtime");
                }
                Err(e) => {
                    warn!("Configuration update rejected: {}", e);
                    if let ConfigError::ValidationFailed(msg) = e {
                        sink.emit(&AppEvent::ConfigRejected(msg));
                    } else {
                        sink.emit(&AppEvent::ConfigRejected("invalid config"));
                    }
                }
            },
        }
    }

    /// Validate a runtime update.  The UART is installed once at boot, so
    /// port and baud changes only take effect through a stored config and
    /// a restart.
    fn check_update(&self, new_config: &RoverConfig) -> Result<(), ConfigError> {
        new_config.validate()?;
        let (old, new) = (&self.config.link, &new_config.link);
        if old.uart_port != new.uart_port || old.baud_rate != new.baud_rate {
            return Err(ConfigError::ValidationFailed(
                "uart port and baud rate apply after restart",
            ));
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &RoverConfig {
        &self.config
    }

    pub fn orientation(&self) -> &OrientationState {
        self.tracker.state()
    }

    pub fn is_calibrated(&self) -> bool {
        self.tracker.is_calibrated()
    }

    pub fn drive_mode(&self) -> DriveMode {
        self.tracker.drive_mode()
    }

    /// The most recent command written to the actuator.
    pub fn last_command(&self) -> Option<Command> {
        self.last_command
    }

    pub fn stats(&self) -> ServiceStats {
        self.stats
    }
}
