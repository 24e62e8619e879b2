//! Fluent builder for constructing [`Yx5300Player`] instances.
//!
//! Separates configuration from construction so that callers can set up
//! serial parameters and reply windows before the transport is opened.
//!
//! # Example
//!
//! ```no_run
//! use hauntlib_yx5300::builder::Yx5300PlayerBuilder;
//! use hauntlib_yx5300::models::dfplayer_mini;
//! use std::time::Duration;
//!
//! # async fn example() -> hauntlib_core::Result<()> {
//! let mut player = Yx5300PlayerBuilder::new(dfplayer_mini())
//!     .serial_port("/dev/ttyUSB0")
//!     .command_timeout(Duration::from_millis(300))
//!     .build()
//!     .await?;
//! player.reset().await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use hauntlib_core::error::{Error, Result};
use hauntlib_core::transport::Transport;

use crate::models::PlayerModel;
use crate::player::{Yx5300Player, DEFAULT_COMMAND_TIMEOUT, DEFAULT_RESET_TIMEOUT};

/// Fluent builder for [`Yx5300Player`].
///
/// All configuration has sensible defaults derived from the
/// [`PlayerModel`], so the simplest usage is:
///
/// ```ignore
/// let player = Yx5300PlayerBuilder::new(dfplayer_mini())
///     .serial_port("/dev/ttyUSB0")
///     .build()
///     .await?;
/// ```
pub struct Yx5300PlayerBuilder {
    model: PlayerModel,
    serial_port: Option<String>,
    baud_rate: Option<u32>,
    command_timeout: Duration,
    reset_timeout: Duration,
}

impl Yx5300PlayerBuilder {
    /// Create a new builder for the given board model.
    pub fn new(model: PlayerModel) -> Self {
        Yx5300PlayerBuilder {
            model,
            serial_port: None,
            baud_rate: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default baud rate for this model.
    ///
    /// The whole chip family runs at 9600; this exists for boards that
    /// have been reconfigured out of spec.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = Some(baud);
        self
    }

    /// Set the window for waiting for a reply to a single command or
    /// query (default: 200ms).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the window for the hardware reset at the start of the
    /// initialization handshake (default: 10s). The chip re-scans every
    /// attached filesystem before answering, so this needs to be long.
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }

    /// Build a [`Yx5300Player`] with a caller-provided transport.
    ///
    /// This is the primary entry point for testing (pass a
    /// `MockTransport` from `hauntlib-test-harness`) and for advanced
    /// use cases where the caller manages the transport directly.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<Yx5300Player> {
        if self.command_timeout.is_zero() {
            return Err(Error::InvalidParameter(
                "command_timeout must be non-zero".into(),
            ));
        }
        if self.reset_timeout < self.command_timeout {
            return Err(Error::InvalidParameter(
                "reset_timeout must be at least command_timeout".into(),
            ));
        }

        Ok(Yx5300Player::with_timeouts(
            transport,
            self.command_timeout,
            self.reset_timeout,
        ))
    }

    /// Build a [`Yx5300Player`] using a serial transport.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been
    /// called. The baud rate defaults to the model's default if not
    /// overridden.
    pub async fn build(self) -> Result<Yx5300Player> {
        let port = self
            .serial_port
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;
        let baud = self.baud_rate.unwrap_or(self.model.default_baud_rate);

        let transport = hauntlib_transport::SerialTransport::open(port, baud).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{catalex_yx5300, dfplayer_mini};
    use hauntlib_test_harness::MockTransport;

    #[tokio::test]
    async fn build_requires_a_serial_port() {
        let result = Yx5300PlayerBuilder::new(dfplayer_mini()).build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn build_with_transport_uses_configured_windows() {
        let player = Yx5300PlayerBuilder::new(catalex_yx5300())
            .command_timeout(Duration::from_millis(300))
            .reset_timeout(Duration::from_secs(5))
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();
        assert!(player.is_connected());
        assert!(!player.handshake_active());
    }

    #[tokio::test]
    async fn zero_command_timeout_is_rejected() {
        let result = Yx5300PlayerBuilder::new(dfplayer_mini())
            .command_timeout(Duration::ZERO)
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn reset_window_shorter_than_command_window_is_rejected() {
        let result = Yx5300PlayerBuilder::new(dfplayer_mini())
            .reset_timeout(Duration::from_millis(100))
            .build_with_transport(Box::new(MockTransport::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }
}
