//! hauntlib-core: Core traits, types, and error definitions for hauntlib.
//!
//! This crate defines the module-agnostic abstractions shared by the
//! hauntlib protocol drivers. Prop controllers and show sequencers depend
//! on these types without pulling in any specific chip driver.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`PlayerEvent`] -- decoded notifications and query responses
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod events;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use hauntlib_core::*`.
pub use error::{Error, Result};
pub use events::PlayerEvent;
pub use transport::Transport;
pub use types::*;
