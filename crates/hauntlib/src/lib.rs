//! # hauntlib -- Serial Audio Module Control for Halloween Props
//!
//! `hauntlib` is an asynchronous Rust library for driving the serial
//! audio modules commonly wired into haunt props: the DFPlayer Mini, the
//! Catalex Serial MP3 Player, the Flyron FN-M16P, and the many clones
//! built on the YX5200/YX5300 chip family. It is designed for prop
//! controllers where an audio cue has to line up with a pneumatic valve
//! or a motion trigger, and where the module at the end of the wire is a
//! three-dollar board with quirky firmware.
//!
//! ## Quick Start
//!
//! Add `hauntlib` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! hauntlib = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a module, let it initialize, and play a track:
//!
//! ```no_run
//! use hauntlib::yx5300::{models::dfplayer_mini, Yx5300PlayerBuilder};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut player = Yx5300PlayerBuilder::new(dfplayer_mini())
//!         .serial_port("/dev/ttyUSB0")
//!         .build()
//!         .await?;
//!
//!     // Reset the hardware and run the initialization handshake.
//!     player.reset().await?;
//!     while player.handshake_active() {
//!         player.poll().await?;
//!         tokio::time::sleep(Duration::from_millis(10)).await;
//!     }
//!
//!     player.set_volume(20).await?;
//!     player.play_track(1, 5).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                  | Purpose                                       |
//! |------------------------|-----------------------------------------------|
//! | `hauntlib-core`        | [`Transport`] trait, [`PlayerEvent`], types, errors |
//! | `hauntlib-transport`   | Serial transport implementation               |
//! | `hauntlib-yx5300`      | YX5200/YX5300 framed protocol driver           |
//! | `hauntlib-test-harness`| `MockTransport` for hardware-free testing      |
//! | **`hauntlib`**         | This facade crate -- re-exports everything    |
//!
//! ## Polling Model
//!
//! The driver is deliberately single-owner and poll-driven. The module
//! speaks a half-duplex request/response protocol with one expectation
//! in flight, so there is no background IO task: call
//! [`poll`](yx5300::Yx5300Player::poll) from your control loop and each
//! call drains pending serial bytes, dispatches completed frames, and
//! fires the reply timeout if it expired. Long gaps between polls
//! lengthen reply latency and risk spurious timeouts.
//!
//! ## Event Subscription
//!
//! The driver emits [`PlayerEvent`]s through a broadcast channel.
//! Subscribe to see replies, async notifications (track finished, SD
//! card pulled), and handshake outcomes:
//!
//! ```no_run
//! use hauntlib::PlayerEvent;
//! # async fn example(player: &hauntlib::yx5300::Yx5300Player) {
//! let mut events = player.subscribe();
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         PlayerEvent::TrackFinished { device, file_index } => {
//!             println!("finished {} on {}", file_index, device);
//!         }
//!         other => println!("{:?}", other),
//!     }
//! }
//! # }
//! ```
//!
//! ## Supported Boards
//!
//! - **DFPlayer Mini** (YX5200-24SS): SD + USB storage
//! - **Catalex Serial MP3 Player** (YX5300): SD only, no version query
//! - **Flyron FN-M16P**: the best-documented variant
//! - Most unbranded clones, including boards that omit frame checksums

pub use hauntlib_core::*;

/// YX5200/YX5300 protocol backend.
///
/// Provides [`Yx5300Player`](yx5300::Yx5300Player) and
/// [`Yx5300PlayerBuilder`](yx5300::Yx5300PlayerBuilder) for driving
/// DFPlayer Mini-style boards over their framed serial protocol.
pub mod yx5300 {
    pub use hauntlib_yx5300::*;
}

/// Transport implementations.
///
/// Provides [`SerialTransport`](transport::SerialTransport) for
/// hardware UARTs and USB serial adapters.
pub mod transport {
    pub use hauntlib_transport::*;
}
