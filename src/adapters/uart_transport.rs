//! UART telemetry transport.
//!
//! Reads are non-blocking against the driver's RX ring buffer: whatever
//! has arrived is returned, `Ok(0)` if nothing has.  The read loop paces
//! idle polls with its back-off timer.  On host builds the hw_init stubs
//! make this a link that never yields data.

use log::info;

use crate::drivers::hw_init;
use crate::error::TransportError;
use crate::telemetry::transport::Transport;

pub struct UartTransport {
    port: u8,
    closed: bool,
}

impl UartTransport {
    /// Wrap an already-installed UART driver (see
    /// [`hw_init::init_peripherals`]).
    pub fn new(port: u8) -> Self {
        Self { port, closed: false }
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for UartTransport {
    async fn read_partial(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        hw_init::uart_read(self.port, buf).map_err(TransportError::Driver)
    }

    async fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        hw_init::uart_write(self.port, data).map_err(TransportError::Driver)
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        hw_init::uart_release(self.port);
        info!("UART{}: closed", self.port);
    }
}

impl Drop for UartTransport {
    fn drop(&mut self) {
        self.close();
    }
}
