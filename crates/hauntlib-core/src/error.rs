//! Error types for hauntlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer and protocol-layer
//! failures are both captured here.
//!
//! Note that errors *reported by the audio module itself* (bad checksum,
//! track not found, and so on) are not `Error` variants: the module delivers
//! them as ordinary protocol messages, and the driver surfaces them as
//! [`PlayerEvent::Error`](crate::events::PlayerEvent::Error) carrying an
//! [`ErrorCode`](crate::types::ErrorCode).

/// The error type for all hauntlib operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open/read/write failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (unexpected traffic on the wire).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for bytes from the module.
    ///
    /// At the transport level this just means no data arrived within the
    /// read deadline; the driver treats it as "nothing to do this poll".
    #[error("timeout waiting for data")]
    Timeout,

    /// An invalid parameter was passed to a driver method.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the module has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the module was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("port busy".into());
        assert_eq!(e.to_string(), "transport error: port busy");
    }

    #[test]
    fn error_display_protocol() {
        let e = Error::Protocol("stray byte".into());
        assert_eq!(e.to_string(), "protocol error: stray byte");
    }

    #[test]
    fn error_display_timeout() {
        assert_eq!(Error::Timeout.to_string(), "timeout waiting for data");
    }

    #[test]
    fn error_display_not_connected() {
        assert_eq!(Error::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }
}
