//! Core types used throughout hauntlib.
//!
//! These are the semantic values the serial audio modules talk about:
//! source devices, playback state, equalizer presets, and the module's own
//! error code catalog. They are shared between the protocol driver and
//! applications so that event consumers never see raw wire bytes.

use std::fmt;

/// A source backing store the module can play audio from, plus the
/// pseudo-device the status query reports while the module sleeps.
///
/// Datasheet synonyms: the SD card slot is sometimes called TF (True
/// Flash), the AUX input is typically a PC connection, and the internal
/// flash memory is an SPI device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    /// A storage device connected via USB.
    Usb,
    /// An SD card in the TF slot.
    SdCard,
    /// The auxiliary line input, typically a connection to a PC.
    Aux,
    /// Pseudo-device indicating the module is sleeping.
    Sleep,
    /// Internal flash memory.
    Flash,
}

impl Device {
    /// Bit position of this device in a [`DeviceMask`].
    fn bit(self) -> u8 {
        match self {
            Device::Usb => 0,
            Device::SdCard => 1,
            Device::Aux => 2,
            Device::Sleep => 3,
            Device::Flash => 4,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Device::Usb => "USB",
            Device::SdCard => "SD card",
            Device::Aux => "AUX",
            Device::Sleep => "sleep",
            Device::Flash => "flash",
        };
        write!(f, "{s}")
    }
}

/// A set of [`Device`]s, as reported by the module's init-complete
/// notification ("these sources are online").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceMask(u8);

impl DeviceMask {
    /// The empty set.
    pub const EMPTY: DeviceMask = DeviceMask(0);

    /// Add a device to the set.
    pub fn with(self, device: Device) -> Self {
        DeviceMask(self.0 | (1 << device.bit()))
    }

    /// Returns `true` if the set contains `device`.
    pub fn contains(self, device: Device) -> bool {
        self.0 & (1 << device.bit()) != 0
    }

    /// Returns `true` if no device is in the set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DeviceMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for dev in [Device::Usb, Device::SdCard, Device::Aux, Device::Flash] {
            if self.contains(dev) {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{dev}")?;
                first = false;
            }
        }
        if first {
            write!(f, "none")?;
        }
        Ok(())
    }
}

/// The module's playback state, as decoded from a status query response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleState {
    /// Playback stopped.
    Stopped,
    /// A track is playing.
    Playing,
    /// Playback paused.
    Paused,
    /// The module is asleep.
    Asleep,
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModuleState::Stopped => "stopped",
            ModuleState::Playing => "playing",
            ModuleState::Paused => "paused",
            ModuleState::Asleep => "asleep",
        };
        write!(f, "{s}")
    }
}

/// Equalizer preset.
///
/// Selecting an equalizer interrupts the current playback, so it's best to
/// select the EQ before starting playback (or pause around the change).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Equalizer {
    Normal,
    Pop,
    Rock,
    Jazz,
    Classical,
    Bass,
}

impl Equalizer {
    /// Wire value of this preset.
    pub fn raw(self) -> u16 {
        match self {
            Equalizer::Normal => 0,
            Equalizer::Pop => 1,
            Equalizer::Rock => 2,
            Equalizer::Jazz => 3,
            Equalizer::Classical => 4,
            Equalizer::Bass => 5,
        }
    }

    /// Decode a wire value; out-of-catalog values map to `None`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Equalizer::Normal),
            1 => Some(Equalizer::Pop),
            2 => Some(Equalizer::Rock),
            3 => Some(Equalizer::Jazz),
            4 => Some(Equalizer::Classical),
            5 => Some(Equalizer::Bass),
            _ => None,
        }
    }
}

impl fmt::Display for Equalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Equalizer::Normal => "normal",
            Equalizer::Pop => "pop",
            Equalizer::Rock => "rock",
            Equalizer::Jazz => "jazz",
            Equalizer::Classical => "classical",
            Equalizer::Bass => "bass",
        };
        write!(f, "{s}")
    }
}

/// Playback sequence, as decoded from a playback-sequence query response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackSequence {
    /// Play all files on the device in file-index order, repeatedly.
    LoopAll,
    /// Loop the files in one folder.
    LoopFolder,
    /// Play a single file repeatedly.
    LoopTrack,
    /// Play all files in a random order.
    Random,
    /// Play one file and stop.
    Single,
}

impl PlaybackSequence {
    /// Decode a wire value; out-of-catalog values map to `None`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(PlaybackSequence::LoopAll),
            1 => Some(PlaybackSequence::LoopFolder),
            2 => Some(PlaybackSequence::LoopTrack),
            3 => Some(PlaybackSequence::Random),
            4 => Some(PlaybackSequence::Single),
            _ => None,
        }
    }
}

impl fmt::Display for PlaybackSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackSequence::LoopAll => "loop all",
            PlaybackSequence::LoopFolder => "loop folder",
            PlaybackSequence::LoopTrack => "loop track",
            PlaybackSequence::Random => "random",
            PlaybackSequence::Single => "single",
        };
        write!(f, "{s}")
    }
}

/// Error codes carried by the module's error message (msg id `0x40`),
/// plus the reserved code the driver synthesizes when a reply never
/// arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The message id used is not supported (0x00).
    Unsupported,
    /// Module busy or no sources installed (0x01).
    NoSources,
    /// The module is sleeping (0x02).
    Sleeping,
    /// Serial communication error (0x03).
    SerialError,
    /// The module received a bad checksum (0x04).
    BadChecksum,
    /// File index out of range (0x05).
    FileOutOfRange,
    /// Couldn't find a track by numeric prefix (0x06).
    TrackNotFound,
    /// Couldn't start an ADVERT track insertion (0x07).
    InsertionError,
    /// SD card error (0x08).
    SdCardError,
    /// Entered sleep mode (0x0A).
    EnteredSleep,
    /// Reserved local code: no reply arrived within the timeout window
    /// (0x0100). Never produced by the hardware.
    TimedOut,
    /// A code outside the documented catalog.
    Unknown(u16),
}

impl ErrorCode {
    /// Wire value of this code.
    pub fn raw(self) -> u16 {
        match self {
            ErrorCode::Unsupported => 0x00,
            ErrorCode::NoSources => 0x01,
            ErrorCode::Sleeping => 0x02,
            ErrorCode::SerialError => 0x03,
            ErrorCode::BadChecksum => 0x04,
            ErrorCode::FileOutOfRange => 0x05,
            ErrorCode::TrackNotFound => 0x06,
            ErrorCode::InsertionError => 0x07,
            ErrorCode::SdCardError => 0x08,
            ErrorCode::EnteredSleep => 0x0A,
            ErrorCode::TimedOut => 0x0100,
            ErrorCode::Unknown(raw) => raw,
        }
    }

    /// Decode a 16-bit parameter into an error code.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0x00 => ErrorCode::Unsupported,
            0x01 => ErrorCode::NoSources,
            0x02 => ErrorCode::Sleeping,
            0x03 => ErrorCode::SerialError,
            0x04 => ErrorCode::BadChecksum,
            0x05 => ErrorCode::FileOutOfRange,
            0x06 => ErrorCode::TrackNotFound,
            0x07 => ErrorCode::InsertionError,
            0x08 => ErrorCode::SdCardError,
            0x0A => ErrorCode::EnteredSleep,
            0x0100 => ErrorCode::TimedOut,
            other => ErrorCode::Unknown(other),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Unsupported => write!(f, "unsupported command"),
            ErrorCode::NoSources => write!(f, "module busy or no sources available"),
            ErrorCode::Sleeping => write!(f, "module sleeping"),
            ErrorCode::SerialError => write!(f, "serial communication error"),
            ErrorCode::BadChecksum => write!(f, "bad checksum"),
            ErrorCode::FileOutOfRange => write!(f, "file index out of range"),
            ErrorCode::TrackNotFound => write!(f, "track not found"),
            ErrorCode::InsertionError => write!(f, "insertion error"),
            ErrorCode::SdCardError => write!(f, "SD card error"),
            ErrorCode::EnteredSleep => write!(f, "entered sleep mode"),
            ErrorCode::TimedOut => write!(f, "timed out"),
            ErrorCode::Unknown(raw) => write!(f, "unknown error code 0x{raw:04X}"),
        }
    }
}
