//! YX5200/YX5300 serial audio module protocol backend for hauntlib.
//!
//! This crate implements the framed serial protocol spoken by the
//! YX5200/YX5300 chip family (DFPlayer Mini, Catalex Serial MP3 Player,
//! Flyron FN-M16P, and their clones). It provides:
//!
//! - **Frame codec** ([`frame`]) -- encode and decode the 10-byte wire
//!   frames with their two's-complement checksum, including byte-by-byte
//!   resynchronization and the checksum-less 8-byte form some clone
//!   boards send.
//! - **Model definitions** ([`models`]) -- static descriptions of the
//!   supported boards and their quirks.
//! - **Yx5300Player** ([`player`]) -- the poll-driven protocol driver:
//!   playback commands and queries, decoded
//!   [`PlayerEvent`](hauntlib_core::PlayerEvent) broadcasting, the
//!   multi-step initialization handshake, and reply-timeout supervision.
//! - **Yx5300PlayerBuilder** ([`builder`]) -- fluent builder for
//!   constructing `Yx5300Player` instances with configurable serial
//!   parameters and reply windows.
//!
//! # Example
//!
//! ```
//! use hauntlib_yx5300::frame::Frame;
//!
//! // Build a "set volume to 15" command, feedback requested.
//! let cmd = Frame::assemble(0x06, 0x000F, true);
//! assert_eq!(
//!     cmd.bytes(),
//!     &[0x7E, 0xFF, 0x06, 0x06, 0x01, 0x00, 0x0F, 0xFE, 0xE5, 0xEF]
//! );
//!
//! // Feed a received byte stream through the decoder.
//! let mut rx = Frame::new();
//! let complete = cmd.bytes().iter().map(|&b| rx.push(b)).any(|done| done);
//! assert!(complete && rx.is_valid());
//! ```

pub mod builder;
mod commands;
pub mod frame;
mod handshake;
pub mod models;
mod notify;
pub mod player;
mod timeout;

pub use builder::Yx5300PlayerBuilder;
pub use player::Yx5300Player;
