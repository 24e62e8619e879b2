//! Message-id catalog and command policy for the YX5200/YX5300 family.
//!
//! All functions here are pure: they decide which message id and
//! parameter to put on the wire without performing any I/O. The driver in
//! [`player`](crate::player) feeds the results through the frame encoder
//! and the transport.
//!
//! Message ids are shared between directions: a query and its response
//! carry the same id.

use hauntlib_core::Device;

// ---------------------------------------------------------------
// Commands
// ---------------------------------------------------------------

pub(crate) const CMD_PLAY_NEXT: u8 = 0x01;
pub(crate) const CMD_PLAY_PREVIOUS: u8 = 0x02;
pub(crate) const CMD_PLAY_FILE: u8 = 0x03;
pub(crate) const CMD_SET_VOLUME: u8 = 0x06;
pub(crate) const CMD_SELECT_EQ: u8 = 0x07;
pub(crate) const CMD_LOOP_FILE: u8 = 0x08;
pub(crate) const CMD_SELECT_SOURCE: u8 = 0x09;
pub(crate) const CMD_SLEEP: u8 = 0x0A;
/// Seems buggy on real hardware; prefer `reset` or `select_source`.
pub(crate) const CMD_WAKE: u8 = 0x0B;
pub(crate) const CMD_RESET: u8 = 0x0C;
/// The datasheets call this "resume"; it undoes a pause.
pub(crate) const CMD_UNPAUSE: u8 = 0x0D;
pub(crate) const CMD_PAUSE: u8 = 0x0E;
pub(crate) const CMD_PLAY_FROM_FOLDER: u8 = 0x0F;
pub(crate) const CMD_LOOP_ALL: u8 = 0x11;
/// "MP3" refers to the name of the folder, which may also hold .wav files.
pub(crate) const CMD_PLAY_FROM_MP3: u8 = 0x12;
pub(crate) const CMD_INSERT_ADVERT: u8 = 0x13;
pub(crate) const CMD_PLAY_FROM_BIG_FOLDER: u8 = 0x14;
pub(crate) const CMD_STOP_ADVERT: u8 = 0x15;
pub(crate) const CMD_STOP: u8 = 0x16;
pub(crate) const CMD_LOOP_FOLDER: u8 = 0x17;
pub(crate) const CMD_RANDOM_PLAY: u8 = 0x18;
pub(crate) const CMD_DISABLE_DAC: u8 = 0x1A;

// ---------------------------------------------------------------
// Asynchronous notifications from the module
// ---------------------------------------------------------------

pub(crate) const NTF_DEVICE_INSERTED: u8 = 0x3A;
pub(crate) const NTF_DEVICE_REMOVED: u8 = 0x3B;
pub(crate) const NTF_FINISHED_USB_FILE: u8 = 0x3C;
pub(crate) const NTF_FINISHED_SD_FILE: u8 = 0x3D;
pub(crate) const NTF_FINISHED_FLASH_FILE: u8 = 0x3E;
/// Quasi-asynchronous: sent after power-on and after a reset command.
pub(crate) const NTF_INIT_COMPLETE: u8 = 0x3F;

// ---------------------------------------------------------------
// Basic replies
// ---------------------------------------------------------------

pub(crate) const RSP_ERROR: u8 = 0x40;
pub(crate) const RSP_ACK: u8 = 0x41;

// ---------------------------------------------------------------
// Queries and their responses
// ---------------------------------------------------------------

pub(crate) const QRY_STATUS: u8 = 0x42;
pub(crate) const QRY_VOLUME: u8 = 0x43;
pub(crate) const QRY_EQ: u8 = 0x44;
pub(crate) const QRY_PLAYBACK_SEQUENCE: u8 = 0x45;
pub(crate) const QRY_FIRMWARE_VERSION: u8 = 0x46;
pub(crate) const QRY_USB_FILE_COUNT: u8 = 0x47;
pub(crate) const QRY_SD_FILE_COUNT: u8 = 0x48;
pub(crate) const QRY_FLASH_FILE_COUNT: u8 = 0x49;
// No 0x4A in the datasheets.
pub(crate) const QRY_CURRENT_USB_FILE: u8 = 0x4B;
pub(crate) const QRY_CURRENT_SD_FILE: u8 = 0x4C;
pub(crate) const QRY_CURRENT_FLASH_FILE: u8 = 0x4D;
pub(crate) const QRY_FOLDER_TRACK_COUNT: u8 = 0x4E;
pub(crate) const QRY_FOLDER_COUNT: u8 = 0x4F;

/// Reserved message id for the handshake engine's synthetic enter-state
/// event. The real protocol never produces id 0x00, so there is no
/// collision with wire traffic.
pub(crate) const ENTER_STATE: u8 = 0x00;

// ---------------------------------------------------------------
// Command policy
// ---------------------------------------------------------------

/// Pick the wire encoding for playing a track out of a numbered folder.
///
/// The hardware has two incompatible addressing schemes. Tracks below 256
/// use the "play from folder" command with the folder in the high byte;
/// larger track numbers need the "big folder" command, which packs the
/// folder into four bits and caps the track at 3000. Anything outside
/// both schemes is unaddressable and maps to `None` (deliberately no wire
/// traffic, mirroring the hardware's constraints).
pub(crate) fn play_track_message(folder: u16, track: u16) -> Option<(u8, u16)> {
    if track < 256 {
        Some((CMD_PLAY_FROM_FOLDER, (folder << 8) | track))
    } else if folder < 16 && track <= 3000 {
        Some((CMD_PLAY_FROM_BIG_FOLDER, (folder << 12) | track))
    } else {
        None
    }
}

/// Clamp a requested volume to the range the hardware agrees on.
///
/// Catalex boards effectively go to 31 but don't clamp out-of-range
/// values themselves; the DFPlayer Mini goes to 30 and clamps there. We
/// make them behave the same way.
pub(crate) fn clamp_volume(volume: i16) -> u16 {
    volume.clamp(0, 30) as u16
}

/// Wire parameter for selecting a source device, or `None` for devices
/// the select-source command doesn't address.
pub(crate) fn select_source_param(device: Device) -> Option<u16> {
    match device {
        Device::Usb => Some(1),
        Device::SdCard => Some(2),
        Device::Flash => Some(5),
        _ => None,
    }
}

/// Query id for the file count on a device, or `None` for devices without
/// a file count query.
pub(crate) fn file_count_query(device: Device) -> Option<u8> {
    match device {
        Device::Usb => Some(QRY_USB_FILE_COUNT),
        Device::SdCard => Some(QRY_SD_FILE_COUNT),
        Device::Flash => Some(QRY_FLASH_FILE_COUNT),
        _ => None,
    }
}

/// Query id for the current file index on a device, or `None` for devices
/// without one.
pub(crate) fn current_file_query(device: Device) -> Option<u8> {
    match device {
        Device::Usb => Some(QRY_CURRENT_USB_FILE),
        Device::SdCard => Some(QRY_CURRENT_SD_FILE),
        Device::Flash => Some(QRY_CURRENT_FLASH_FILE),
        _ => None,
    }
}
