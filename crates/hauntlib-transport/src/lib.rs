//! Transport implementations for hauntlib.
//!
//! Provides [`SerialTransport`], the serial port implementation of the
//! [`Transport`](hauntlib_core::Transport) trait used to talk to audio
//! modules over a UART or a USB serial adapter.

pub mod serial;

pub use serial::SerialTransport;
