//! Mock adapters for integration tests.
//!
//! Records every actuator call and event so tests can assert on the full
//! history without touching real GPIO/PWM registers, and replays a fixed
//! script of transport reads.

use std::collections::VecDeque;

use embedded_hal::digital::PinState;
use tiltdrive::app::commands::AppCommand;
use tiltdrive::app::events::AppEvent;
use tiltdrive::app::ports::{ActuatorPort, EventSink};
use tiltdrive::control::drive::{Command, PinWrite};
use tiltdrive::error::TransportError;
use tiltdrive::telemetry::channels::{CancelToken, CommandQueue};
use tiltdrive::telemetry::transport::Transport;

// ── MockActuator ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockActuator {
    pub writes: Vec<PinWrite>,
}

#[allow(dead_code)]
impl MockActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written to an analog pin, if any.
    pub fn power(&self, pin: u8) -> Option<u8> {
        self.writes.iter().rev().find_map(|w| match w {
            PinWrite::Analog(p, v) if *p == pin => Some(*v),
            _ => None,
        })
    }

    /// Last level written to a digital pin, if any.
    pub fn level(&self, pin: u8) -> Option<PinState> {
        self.writes.iter().rev().find_map(|w| match w {
            PinWrite::Digital(p, s) if *p == pin => Some(*s),
            _ => None,
        })
    }
}

impl ActuatorPort for MockActuator {
    fn set_digital(&mut self, pin: u8, state: PinState) {
        self.writes.push(PinWrite::Digital(pin, state));
    }

    fn set_analog(&mut self, pin: u8, value: u8) {
        self.writes.push(PinWrite::Analog(pin, value));
    }
}

// ── MockSink ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands issued, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::CommandIssued { command, .. } => Some(*command),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for MockSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── ScriptedTransport ─────────────────────────────────────────

#[allow(dead_code)]
pub enum Step {
    Data(Vec<u8>),
    Idle,
    Fail(TransportError),
    /// Queue a command (applied before the next read), then read nothing.
    Submit(AppCommand),
    /// Queue a command, then leave the read pending forever (a silent
    /// link).
    SubmitAndWait(AppCommand),
}

/// Replays `Step`s in order.  When the script runs out it either cancels
/// `cancel_when_done` and then blocks forever (a read that is in flight
/// when cancellation arrives), or reports `Closed`.
pub struct ScriptedTransport<'a> {
    steps: VecDeque<Step>,
    cancel_when_done: Option<&'a CancelToken>,
    queue: Option<&'a CommandQueue>,
    pub closes: usize,
    pub reads: usize,
}

#[allow(dead_code)]
impl<'a> ScriptedTransport<'a> {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            cancel_when_done: None,
            queue: None,
            closes: 0,
            reads: 0,
        }
    }

    pub fn cancelling(mut self, token: &'a CancelToken) -> Self {
        self.cancel_when_done = Some(token);
        self
    }

    pub fn with_queue(mut self, queue: &'a CommandQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Convenience: one `Data` step per text chunk.
    pub fn text(chunks: &[&str]) -> Self {
        Self::new(chunks.iter().map(|c| Step::Data(c.as_bytes().to_vec())))
    }
}

impl Transport for ScriptedTransport<'_> {
    async fn read_partial(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.reads += 1;
        match self.steps.pop_front() {
            Some(Step::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(Step::Idle) => Ok(0),
            Some(Step::Fail(e)) => Err(e),
            Some(Step::Submit(cmd)) => {
                let queue = self.queue.expect("Submit step needs with_queue()");
                assert!(queue.submit(cmd));
                Ok(0)
            }
            Some(Step::SubmitAndWait(cmd)) => {
                let queue = self.queue.expect("SubmitAndWait step needs with_queue()");
                assert!(queue.submit(cmd));
                core::future::pending().await
            }
            None => match self.cancel_when_done {
                Some(token) => {
                    token.cancel();
                    core::future::pending().await
                }
                None => Err(TransportError::Closed),
            },
        }
    }

    async fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        Ok(data.len())
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}
