//! Mock transport for deterministic testing of the protocol driver.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs plus an injectable inbound byte queue. This lets
//! you test frame encoding, the initialization handshake, and notification
//! decoding without a real module on a serial port.
//!
//! The driver takes ownership of its transport, so the mock shares its
//! state behind an `Arc`: clone it, hand one clone to the driver, and keep
//! the other for scripting and assertions.
//!
//! # Example
//!
//! ```
//! use hauntlib_test_harness::MockTransport;
//!
//! let mock = MockTransport::new();
//! // Pre-load: when the driver sends this frame, these bytes arrive back.
//! mock.expect(
//!     &[0x7E, 0xFF, 0x06, 0x46, 0x00, 0x00, 0x00, 0xFE, 0xB5, 0xEF],
//!     &[0x7E, 0xFF, 0x06, 0x46, 0x00, 0x02, 0x05, 0xFE, 0xAE, 0xEF],
//! );
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hauntlib_core::error::{Error, Result};
use hauntlib_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes that arrive on the wire once the request is seen.
    response: Vec<u8>,
}

#[derive(Debug, Default)]
struct Inner {
    expectations: VecDeque<Expectation>,
    incoming: VecDeque<u8>,
    sent_log: Vec<Vec<u8>>,
    connected: bool,
}

/// A mock [`Transport`] for testing the protocol driver without hardware.
///
/// Expectations are consumed in order. When `send()` is called, the sent
/// data is recorded and matched against the next expectation; the paired
/// response bytes are appended to the inbound queue, where `receive()`
/// drains them. Unsolicited traffic (async notifications, garbage bytes)
/// goes in directly with [`push_incoming`](MockTransport::push_incoming).
///
/// If a send doesn't match or the expectation queue is exhausted, the send
/// returns an error.
#[derive(Debug, Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(Inner {
                connected: true,
                ..Inner::default()
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add an expected request/response pair.
    ///
    /// When `send()` is called with data matching `request`, `response` is
    /// queued as inbound bytes for subsequent `receive()` calls. An empty
    /// response models a module that never answers.
    pub fn expect(&self, request: &[u8], response: &[u8]) {
        self.lock().expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Queue unsolicited inbound bytes, as if the module sent them on its
    /// own (track-finished notifications, device insertion, line noise).
    pub fn push_incoming(&self, bytes: &[u8]) {
        self.lock().incoming.extend(bytes.iter().copied());
    }

    /// All data sent through this transport, one element per `send()` call.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.lock().sent_log.clone()
    }

    /// The number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.lock().expectations.len()
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls will
    /// return [`Error::NotConnected`].
    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        if !inner.connected {
            return Err(Error::NotConnected);
        }

        // Record what was sent.
        inner.sent_log.push(data.to_vec());

        // Match against the next expectation.
        if let Some(expectation) = inner.expectations.pop_front() {
            if data != expectation.request.as_slice() {
                return Err(Error::Protocol(format!(
                    "unexpected send data: expected {:02X?}, got {:02X?}",
                    expectation.request, data
                )));
            }
            inner.incoming.extend(expectation.response.iter().copied());
            Ok(())
        } else {
            Err(Error::Protocol(
                "no more expectations in mock transport".into(),
            ))
        }
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        let mut inner = self.lock();
        if !inner.connected {
            return Err(Error::NotConnected);
        }

        if inner.incoming.is_empty() {
            return Err(Error::Timeout);
        }
        let n = inner.incoming.len().min(buf.len());
        for slot in buf[..n].iter_mut() {
            // Cannot be empty: n is bounded by the queue length.
            if let Some(b) = inner.incoming.pop_front() {
                *slot = b;
            }
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        let mut inner = self.lock();
        inner.connected = false;
        inner.incoming.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.lock().connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hauntlib_core::transport::Transport;

    #[tokio::test]
    async fn basic_send_receive() {
        let mock = MockTransport::new();
        let request = &[0x7E, 0xFF, 0x06, 0x0C, 0x00, 0x00, 0x00, 0xFE, 0xEF, 0xEF];
        let response = &[0x7E, 0xFF, 0x06, 0x3F, 0x00, 0x00, 0x02, 0xFE, 0xB9, 0xEF];

        mock.expect(request, response);

        let mut driver_side = mock.clone();
        driver_side.send(request).await.unwrap();

        let mut buf = [0u8; 64];
        let n = driver_side
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();

        assert_eq!(n, response.len());
        assert_eq!(&buf[..n], response);
    }

    #[tokio::test]
    async fn tracks_sent_data() {
        let mut mock = MockTransport::new();
        let req1 = &[0x01, 0x02];
        let req2 = &[0x03, 0x04];

        mock.expect(req1, &[0xFF]);
        mock.expect(req2, &[0xFE]);

        mock.send(req1).await.unwrap();
        mock.send(req2).await.unwrap();

        assert_eq!(mock.sent_data().len(), 2);
        assert_eq!(mock.sent_data()[0], req1);
        assert_eq!(mock.sent_data()[1], req2);
    }

    #[tokio::test]
    async fn wrong_data_errors() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01], &[0xFF]);

        let result = mock.send(&[0x99]).await;
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
    }

    #[tokio::test]
    async fn no_expectations_errors() {
        let mut mock = MockTransport::new();

        let result = mock.send(&[0x01]).await;
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
    }

    #[tokio::test]
    async fn receive_without_data_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 64];

        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }

    #[tokio::test]
    async fn push_incoming_is_received_without_a_send() {
        let mut mock = MockTransport::new();
        mock.push_incoming(&[0xAA, 0xBB, 0xCC]);

        let mut buf = [0u8; 2];
        let n = mock.receive(&mut buf, Duration::ZERO).await.unwrap();
        assert_eq!(&buf[..n], &[0xAA, 0xBB]);
        let n = mock.receive(&mut buf, Duration::ZERO).await.unwrap();
        assert_eq!(&buf[..n], &[0xCC]);
    }

    #[tokio::test]
    async fn responses_queue_behind_unsolicited_bytes() {
        let mut mock = MockTransport::new();
        mock.push_incoming(&[0x11]);
        mock.expect(&[0x01], &[0x22]);
        mock.send(&[0x01]).await.unwrap();

        let mut buf = [0u8; 8];
        let n = mock.receive(&mut buf, Duration::ZERO).await.unwrap();
        assert_eq!(&buf[..n], &[0x11, 0x22]);
    }

    #[tokio::test]
    async fn disconnect() {
        let mut mock = MockTransport::new();
        assert!(mock.is_connected());

        mock.close().await.unwrap();
        assert!(!mock.is_connected());

        let result = mock.send(&[0x01]).await;
        assert!(matches!(result.unwrap_err(), Error::NotConnected));
    }

    #[tokio::test]
    async fn shared_state_across_clones() {
        let mock = MockTransport::new();
        mock.expect(&[0x01], &[0xFF]);
        assert_eq!(mock.remaining_expectations(), 1);

        let mut driver_side = mock.clone();
        driver_side.send(&[0x01]).await.unwrap();

        assert_eq!(mock.remaining_expectations(), 0);
        assert_eq!(mock.sent_data().len(), 1);
    }
}
