//! Serial port transport for audio module communication.
//!
//! This module provides [`SerialTransport`], which implements the
//! [`Transport`] trait for a hardware UART or a USB serial adapter wired
//! to a module's RX/TX pins.
//!
//! The whole YX5200/YX5300 family runs at 9600 baud, 8 data bits, no
//! parity, one stop bit, no flow control; the port is always configured
//! that way apart from the baud rate, which can be overridden for boards
//! reconfigured out of spec.
//!
//! A 1K series resistor on the module's RX line is a good idea on 5V
//! controllers; without it some boards pick up noise that shows up here
//! as framing garbage.
//!
//! # Example
//!
//! ```no_run
//! use hauntlib_transport::SerialTransport;
//! use hauntlib_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> hauntlib_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 9600).await?;
//!
//! // Send a "query firmware version" frame.
//! transport
//!     .send(&[0x7E, 0xFF, 0x06, 0x46, 0x00, 0x00, 0x00, 0xFE, 0xB5, 0xEF])
//!     .await?;
//!
//! // Poll for reply bytes.
//! let mut buf = [0u8; 32];
//! let n = transport.receive(&mut buf, Duration::from_millis(200)).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use hauntlib_core::error::{Error, Result};
use hauntlib_core::transport::Transport;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Serial port transport for audio module communication.
pub struct SerialTransport {
    /// The underlying serial port stream.
    port: Option<SerialStream>,
    /// Port name for logging/debugging.
    port_name: String,
}

impl SerialTransport {
    /// Open a serial port configured for the module family: 8 data
    /// bits, no parity, one stop bit, no flow control.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyUSB0" on Linux,
    ///   "COM3" on Windows)
    /// * `baud_rate` - Baud rate; 9600 for every known board
    pub async fn open(port: &str, baud_rate: u32) -> Result<Self> {
        tracing::debug!(port = %port, baud_rate, "Opening serial port");

        let serial_stream = tokio_serial::new(port, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                tracing::error!(port = %port, error = %e, "Failed to open serial port");
                Error::Transport(format!("Failed to open serial port {}: {}", port, e))
            })?;

        tracing::info!(port = %port, baud_rate, "Serial port opened");

        Ok(Self {
            port: Some(serial_stream),
            port_name: port.to_string(),
        })
    }

    /// Get the name of the serial port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(
            port = %self.port_name,
            bytes = data.len(),
            data = ?data,
            "Sending data"
        );

        port.write_all(data).await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "Failed to send data");
            if e.kind() == std::io::ErrorKind::BrokenPipe
                || e.kind() == std::io::ErrorKind::NotConnected
            {
                Error::ConnectionLost
            } else {
                Error::Io(e)
            }
        })?;

        // Flush so the frame hits the wire before the reply window opens.
        port.flush().await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "Failed to flush serial port");
            Error::Io(e)
        })?;

        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        // A zero timeout still returns buffered bytes: the read future
        // is polled before the deadline is considered.
        let result = tokio::time::timeout(timeout, port.read(buf)).await;

        match result {
            Ok(Ok(n)) => {
                tracing::trace!(
                    port = %self.port_name,
                    bytes = n,
                    data = ?&buf[..n],
                    "Received data"
                );
                Ok(n)
            }
            Ok(Err(e)) => {
                tracing::error!(port = %self.port_name, error = %e, "Failed to receive data");
                if e.kind() == std::io::ErrorKind::BrokenPipe
                    || e.kind() == std::io::ErrorKind::NotConnected
                {
                    Err(Error::ConnectionLost)
                } else {
                    Err(Error::Io(e))
                }
            }
            Err(_) => Err(Error::Timeout),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            tracing::debug!(port = %self.port_name, "Closing serial port");

            if let Err(e) = port.flush().await {
                tracing::warn!(
                    port = %self.port_name,
                    error = %e,
                    "Failed to flush before closing (continuing anyway)"
                );
            }
            // Dropping the stream closes the port.
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nonexistent_port_is_a_transport_error() {
        let result = SerialTransport::open("/dev/does-not-exist-hauntlib", 9600).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn closed_transport_reports_not_connected() {
        // Exercise the disconnected paths without opening a real port.
        let mut transport = SerialTransport {
            port: None,
            port_name: "test".into(),
        };
        assert!(!transport.is_connected());
        assert!(matches!(
            transport.send(&[0x7E]).await,
            Err(Error::NotConnected)
        ));
        let mut buf = [0u8; 8];
        assert!(matches!(
            transport.receive(&mut buf, Duration::ZERO).await,
            Err(Error::NotConnected)
        ));
        assert!(transport.close().await.is_ok());
    }
}
