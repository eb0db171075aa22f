//! Transport abstraction: any byte-oriented telemetry channel.
//!
//! Concrete implementations:
//! - UART (the IMU module's serial link), see
//!   [`UartTransport`](crate::adapters::uart_transport::UartTransport)
//! - [`NullTransport`] for bring-up without a sensor attached
//!
//! The read loop is generic over `Transport`, so adding a new link
//! requires no changes to parsing or decision logic.

use crate::error::TransportError;

/// Byte-oriented, partially-reading transport.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Read up to `buf.len()` bytes into `buf`.
    ///
    /// Returns as soon as *some* bytes are available; `Ok(0)` means the
    /// link is idle right now, not that it is closed.
    async fn read_partial(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write `data`, returning the number of bytes accepted.
    async fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Release the underlying link.  Idempotent.
    fn close(&mut self);
}

/// A transport that never yields data and discards all writes.
#[derive(Debug, Default)]
pub struct NullTransport {
    closed: bool,
}

impl NullTransport {
    pub const fn new() -> Self {
        Self { closed: false }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for NullTransport {
    async fn read_partial(&mut self, _buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        Ok(0)
    }

    async fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        Ok(data.len())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
