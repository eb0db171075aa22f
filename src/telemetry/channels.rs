//! Inter-task plumbing for the read loop.
//!
//! Uses `embassy-sync` primitives so the button thread (or any other
//! producer) can talk to the async read loop without locks around the
//! orientation state.
//!
//! ```text
//! ┌──────────────┐  AppCommand   ┌──────────────┐
//! │ Button / UI  │──────────────▶│  Read loop   │
//! │  (sync)      │──── cancel ──▶│  (async)     │
//! └──────────────┘               └──────────────┘
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::warn;

use crate::app::commands::AppCommand;

/// Depth of the external command queue.
pub const COMMAND_QUEUE_DEPTH: usize = 4;

// ── Cancellation ─────────────────────────────────────────────

/// Cooperative cancellation for the read loop.
///
/// The flag is checked at the top of every cycle; the signal wakes a read
/// that is currently awaiting data.
pub struct CancelToken {
    flag: AtomicBool,
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl CancelToken {
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
            signal: Signal::new(),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
        self.signal.signal(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            self.signal.wait().await;
        }
    }

    /// Re-arm the token so the loop can be started again.
    pub fn reset(&self) {
        self.signal.reset();
        self.flag.store(false, Ordering::Release);
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

// ── External commands ────────────────────────────────────────

/// Bounded queue of commands applied by the read loop between cycles.
pub struct CommandQueue {
    inner: Channel<CriticalSectionRawMutex, AppCommand, COMMAND_QUEUE_DEPTH>,
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    /// Queue a command without blocking.  Returns `false` (and logs) when
    /// the queue is full.
    pub fn submit(&self, cmd: AppCommand) -> bool {
        match self.inner.try_send(cmd) {
            Ok(()) => true,
            Err(_) => {
                warn!("command queue full, dropping command");
                false
            }
        }
    }

    pub fn try_next(&self) -> Option<AppCommand> {
        self.inner.try_receive().ok()
    }

    /// Wait for the next command.
    pub async fn next(&self) -> AppCommand {
        self.inner.receive().await
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
