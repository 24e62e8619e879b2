//! Test utilities for hauntlib.
//!
//! This crate provides [`MockTransport`], a scripted in-memory transport
//! for testing the protocol driver without hardware. It is a dev-dependency
//! of the protocol crates and is not intended for production use.

pub mod mock_serial;

pub use mock_serial::MockTransport;
