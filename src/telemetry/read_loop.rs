//! Async telemetry read loop.
//!
//! Strictly sequential: request bytes, await, process, repeat.  The read is
//! the only suspension point; parsing, calibration and decisions run
//! synchronously between reads, so the orientation state is never touched
//! concurrently.  A command that arrives while a read is pending abandons
//! that read, so a stop request does not wait for the link to speak.
//!
//! ```text
//!  ┌──────────────────────── cycle ─────────────────────────┐
//!  │ cancelled? ─▶ drain commands ─▶ read ∥ cancel ─▶ feed  │
//!  │                    ▲               ∥ command           │
//!  │                    └──── command ───┘                  │
//!  │     │                               │           │      │
//!  │     ▼                               ▼           ▼      │
//!  │  Ok(Cancelled)             Err(Transport)   samples ─▶ │
//!  │                                            RoverService│
//!  └────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop never closes the transport; the caller does that once after
//! [`StreamReadLoop::run`] returns, whatever the outcome.

use core::time::Duration;

use log::{debug, info, warn};

use crate::app::commands::AppCommand;
use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, EventSink};
use crate::app::service::RoverService;
use crate::config::LinkConfig;
use crate::error::{Result, TransportError};

use super::channels::{CancelToken, CommandQueue};
use super::parser::{FrameParser, ParserStats};
use super::transport::Transport;

/// Largest single read.
pub const READ_BUF_SIZE: usize = 1024;

/// What ended one wait on the transport.
enum Wake {
    Read(core::result::Result<usize, TransportError>),
    Command(AppCommand),
}

/// Why the loop returned without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Cancelled,
}

/// Read-side counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub reads: u64,
    pub idle_reads: u64,
    /// Reads abandoned because a command arrived first.
    pub interrupted_reads: u64,
    pub bytes: u64,
}

pub struct StreamReadLoop<'a> {
    cancel: &'a CancelToken,
    commands: &'a CommandQueue,
    parser: FrameParser,
    buf: [u8; READ_BUF_SIZE],
    chunk: usize,
    idle_backoff: Duration,
    stats: LoopStats,
}

impl<'a> StreamReadLoop<'a> {
    /// Build a loop configured from the service's current config.
    pub fn new(service: &RoverService, cancel: &'a CancelToken, commands: &'a CommandQueue) -> Self {
        let mut this = Self {
            cancel,
            commands,
            parser: FrameParser::new(service.config().parser.clone()),
            buf: [0; READ_BUF_SIZE],
            chunk: READ_BUF_SIZE,
            idle_backoff: Duration::ZERO,
            stats: LoopStats::default(),
        };
        this.apply_link(&service.config().link);
        this
    }

    fn apply_link(&mut self, link: &LinkConfig) {
        self.chunk = usize::from(link.read_chunk_bytes).clamp(1, READ_BUF_SIZE);
        self.idle_backoff = Duration::from_millis(u64::from(link.idle_backoff_ms));
    }

    /// Run until cancelled or the transport fails.
    ///
    /// Cancellation (before or during a read) is a clean exit.  Any other
    /// transport error is reported as [`AppEvent::TransportFault`] and
    /// returned.  The parser is reset on every exit.
    pub async fn run<T, A, S>(
        &mut self,
        transport: &mut T,
        service: &mut RoverService,
        actuator: &mut A,
        sink: &mut S,
    ) -> Result<LoopExit>
    where
        T: Transport,
        A: ActuatorPort,
        S: EventSink,
    {
        service.start(sink);
        let outcome = self.cycle(transport, service, actuator, sink).await;
        self.parser.reset();

        match &outcome {
            Ok(exit) => info!("read loop: stopped ({:?})", exit),
            Err(e) => warn!("read loop: terminated: {}", e),
        }
        sink.emit(&AppEvent::Stopped);
        outcome
    }

    async fn cycle<T, A, S>(
        &mut self,
        transport: &mut T,
        service: &mut RoverService,
        actuator: &mut A,
        sink: &mut S,
    ) -> Result<LoopExit>
    where
        T: Transport,
        A: ActuatorPort,
        S: EventSink,
    {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(LoopExit::Cancelled);
            }

            self.drain_commands(service, actuator, sink);

            let (cancel, commands) = (self.cancel, self.commands);
            let buf = &mut self.buf[..self.chunk];
            let read = async { Wake::Read(transport.read_partial(buf).await) };
            let cancelled = async {
                cancel.cancelled().await;
                Wake::Read(Err(TransportError::Cancelled))
            };
            let command = async { Wake::Command(commands.next().await) };
            let wake = futures_lite::future::or(futures_lite::future::or(cancelled, command), read).await;

            let outcome = match wake {
                Wake::Read(outcome) => outcome,
                Wake::Command(cmd) => {
                    self.stats.interrupted_reads += 1;
                    self.apply_command(cmd, service, actuator, sink);
                    continue;
                }
            };
            self.stats.reads += 1;

            match outcome {
                Ok(0) => {
                    self.stats.idle_reads += 1;
                    self.idle().await;
                }
                Ok(n) => {
                    let n = n.min(self.chunk);
                    self.stats.bytes += n as u64;
                    sink.emit(&AppEvent::frame_received(&self.buf[..n]));
                    for sample in self.parser.feed(&self.buf[..n]) {
                        service.process_sample(sample, actuator, sink);
                    }
                }
                Err(e) if e.is_cancelled() => return Ok(LoopExit::Cancelled),
                Err(e) => {
                    sink.emit(&AppEvent::TransportFault(e));
                    return Err(e.into());
                }
            }
        }
    }

    fn drain_commands<A: ActuatorPort, S: EventSink>(
        &mut self,
        service: &mut RoverService,
        actuator: &mut A,
        sink: &mut S,
    ) {
        while let Some(cmd) = self.commands.try_next() {
            self.apply_command(cmd, service, actuator, sink);
        }
    }

    fn apply_command<A: ActuatorPort, S: EventSink>(
        &mut self,
        cmd: AppCommand,
        service: &mut RoverService,
        actuator: &mut A,
        sink: &mut S,
    ) {
        debug!("read loop: applying {:?}", cmd);
        let reconfigure = matches!(cmd, AppCommand::UpdateConfig(_));
        service.handle_command(cmd, actuator, sink);
        if reconfigure {
            self.parser.set_config(service.config().parser.clone());
            self.apply_link(&service.config().link);
        }
    }

    async fn idle(&self) {
        if self.idle_backoff.is_zero() {
            futures_lite::future::yield_now().await;
        } else {
            async_io_mini::Timer::after(self.idle_backoff).await;
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn parser_stats(&self) -> ParserStats {
        self.parser.stats()
    }
}
