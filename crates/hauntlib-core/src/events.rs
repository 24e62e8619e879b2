//! Player event types.
//!
//! Events are emitted by the protocol driver through a
//! `tokio::sync::broadcast` channel whenever an inbound message is
//! decoded. Prop controllers subscribe to these events to trigger the next
//! scare cue when a track finishes, notice an SD card being pulled, or log
//! raw wire traffic while debugging a flaky module.

use crate::types::{Device, DeviceMask, Equalizer, ErrorCode, ModuleState, PlaybackSequence};

/// An event decoded from the module's serial traffic (or synthesized
/// locally by the driver, for timeouts and handshake outcomes).
///
/// Subscribe via the driver's `subscribe()` method. Events are delivered
/// on a best-effort basis through a bounded broadcast channel; slow
/// consumers may miss events under heavy load.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// The module acknowledged a command (feedback was requested).
    Ack,

    /// The module reported an error, or the driver timed out waiting for
    /// a reply ([`ErrorCode::TimedOut`]).
    Error {
        /// The decoded error code.
        code: ErrorCode,
    },

    /// A source device was inserted. One event per device when the
    /// notification carries several bits.
    DeviceInserted {
        /// The device that came online.
        device: Device,
    },

    /// A source device was removed.
    DeviceRemoved {
        /// The device that went away.
        device: Device,
    },

    /// A track finished playing on its own.
    ///
    /// The module sometimes sends these multiple times in quick
    /// succession, and does not send one when playback is stopped
    /// explicitly or when an inserted ADVERT track finishes.
    TrackFinished {
        /// Device the track was playing from.
        device: Device,
        /// File index of the finished track.
        file_index: u16,
    },

    /// Hardware initialization completed after power-on or reset.
    InitComplete {
        /// The set of source devices reported online.
        devices: DeviceMask,
    },

    /// Response to a status query.
    ///
    /// The device byte is documented as unreliable on at least one board
    /// variant (the DFPlayer Mini always seems to report the SD card); it
    /// is decoded as received, without correction.
    Status {
        /// Currently selected device, or [`Device::Sleep`].
        device: Device,
        /// The module's playback state.
        state: ModuleState,
    },

    /// Response to a volume query.
    Volume {
        /// Current volume, 0-30.
        volume: u8,
    },

    /// Response to an equalizer query. `None` if the module reported a
    /// preset outside the documented catalog.
    EqualizerChanged {
        /// Current equalizer preset.
        eq: Option<Equalizer>,
    },

    /// Response to a playback-sequence query. `None` if the module
    /// reported a sequence outside the documented catalog.
    SequenceChanged {
        /// Current playback sequence.
        sequence: Option<PlaybackSequence>,
    },

    /// Response to a firmware version query.
    ///
    /// Catalex boards don't answer this query; expect a timeout instead.
    FirmwareVersion {
        /// Raw 16-bit version value.
        version: u16,
    },

    /// Response to a file count query.
    FileCount {
        /// Device that was counted.
        device: Device,
        /// Number of audio files on the device, including subfolders.
        count: u16,
    },

    /// Response to a current file query.
    CurrentTrack {
        /// Device the file index refers to.
        device: Device,
        /// File index of the current track.
        file_index: u16,
    },

    /// Response to a folder track count query.
    FolderTrackCount {
        /// Number of tracks in the queried folder.
        count: u16,
    },

    /// Response to a folder count query.
    FolderCount {
        /// Number of folders under the root of the current device.
        count: u16,
    },

    /// A frame arrived that failed checksum validation or was otherwise
    /// malformed. Invalid frames never reach the handshake state machine.
    InvalidFrame,

    /// Raw bytes were written to the transport. Useful for protocol
    /// debugging and wire capture.
    FrameSent {
        /// The complete wire frame as transmitted.
        bytes: Vec<u8>,
    },

    /// A complete frame was received, before validation and decoding.
    FrameReceived {
        /// The complete wire frame as received.
        bytes: Vec<u8>,
    },

    /// The initialization handshake finished with a usable source
    /// selected. The driver is ready for arbitrary commands.
    HandshakeComplete {
        /// The selected source device.
        source: Device,
        /// Number of audio files on the selected device.
        files: u16,
        /// Number of folders on the selected device.
        folders: u16,
    },

    /// The initialization handshake gave up: either the hardware never
    /// answered the reset, or no device had any files on it. The driver
    /// is inert until `reset()` is called again.
    HandshakeAbandoned,
}
