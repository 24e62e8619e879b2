//! Inbound message decoding.
//!
//! Translates a validated wire frame into zero or more [`PlayerEvent`]s,
//! converting bitmasks and raw parameter bytes into semantic values.
//! Decoding is pure; the driver handles delivery (broadcast channel,
//! logging, and the handshake state machine).
//!
//! Unknown message ids decode to nothing. The chip family has
//! undocumented vendor-specific traffic; dropping it silently is
//! intentional tolerance, not an error.

use hauntlib_core::{Device, DeviceMask, Equalizer, ErrorCode, ModuleState, PlaybackSequence};
use hauntlib_core::PlayerEvent;

use crate::commands::*;
use crate::frame::Frame;

/// Decode a validated frame into events.
///
/// Device-inserted/removed notifications fan out into one event per set
/// bit in the parameter's low byte (bit 0 = USB, bit 1 = SD, bit 2 = AUX).
pub(crate) fn decode(frame: &Frame) -> Vec<PlayerEvent> {
    match frame.msg_id() {
        NTF_DEVICE_INSERTED => fan_out(frame.param_lo(), |device| {
            PlayerEvent::DeviceInserted { device }
        }),
        NTF_DEVICE_REMOVED => fan_out(frame.param_lo(), |device| {
            PlayerEvent::DeviceRemoved { device }
        }),

        NTF_FINISHED_USB_FILE => vec![PlayerEvent::TrackFinished {
            device: Device::Usb,
            file_index: frame.param(),
        }],
        NTF_FINISHED_SD_FILE => vec![PlayerEvent::TrackFinished {
            device: Device::SdCard,
            file_index: frame.param(),
        }],
        NTF_FINISHED_FLASH_FILE => vec![PlayerEvent::TrackFinished {
            device: Device::Flash,
            file_index: frame.param(),
        }],

        NTF_INIT_COMPLETE => vec![PlayerEvent::InitComplete {
            devices: init_device_mask(frame.param_lo()),
        }],

        RSP_ERROR => vec![PlayerEvent::Error {
            code: ErrorCode::from_raw(frame.param()),
        }],
        RSP_ACK => vec![PlayerEvent::Ack],

        QRY_STATUS => {
            // Only Flyron documents this response. The DFPlayer Mini
            // always seems to report the SD card even when USB is the
            // selected and active device; Catalex also always reports the
            // SD card, but it only has one. Decoded as received.
            let device = match frame.param_hi() {
                0x01 => Device::Usb,
                0x02 => Device::SdCard,
                _ => Device::Sleep,
            };
            let state = match frame.param_lo() {
                0x00 => ModuleState::Stopped,
                0x01 => ModuleState::Playing,
                0x02 => ModuleState::Paused,
                _ => ModuleState::Asleep,
            };
            vec![PlayerEvent::Status { device, state }]
        }

        QRY_VOLUME => vec![PlayerEvent::Volume {
            volume: frame.param_lo(),
        }],
        QRY_EQ => vec![PlayerEvent::EqualizerChanged {
            eq: Equalizer::from_raw(frame.param_lo()),
        }],
        QRY_PLAYBACK_SEQUENCE => vec![PlayerEvent::SequenceChanged {
            sequence: PlaybackSequence::from_raw(frame.param_lo()),
        }],
        QRY_FIRMWARE_VERSION => vec![PlayerEvent::FirmwareVersion {
            version: frame.param(),
        }],

        QRY_USB_FILE_COUNT => vec![PlayerEvent::FileCount {
            device: Device::Usb,
            count: frame.param(),
        }],
        QRY_SD_FILE_COUNT => vec![PlayerEvent::FileCount {
            device: Device::SdCard,
            count: frame.param(),
        }],
        QRY_FLASH_FILE_COUNT => vec![PlayerEvent::FileCount {
            device: Device::Flash,
            count: frame.param(),
        }],

        QRY_CURRENT_USB_FILE => vec![PlayerEvent::CurrentTrack {
            device: Device::Usb,
            file_index: frame.param(),
        }],
        QRY_CURRENT_SD_FILE => vec![PlayerEvent::CurrentTrack {
            device: Device::SdCard,
            file_index: frame.param(),
        }],
        QRY_CURRENT_FLASH_FILE => vec![PlayerEvent::CurrentTrack {
            device: Device::Flash,
            file_index: frame.param(),
        }],

        QRY_FOLDER_TRACK_COUNT => vec![PlayerEvent::FolderTrackCount {
            count: frame.param(),
        }],
        QRY_FOLDER_COUNT => vec![PlayerEvent::FolderCount {
            count: frame.param(),
        }],

        // Undocumented or vendor-specific traffic.
        _ => Vec::new(),
    }
}

/// Expand an inserted/removed bitmask into one event per set bit.
fn fan_out(mask: u8, make: impl Fn(Device) -> PlayerEvent) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    if mask & 0x01 != 0 {
        events.push(make(Device::Usb));
    }
    if mask & 0x02 != 0 {
        events.push(make(Device::SdCard));
    }
    if mask & 0x04 != 0 {
        events.push(make(Device::Aux));
    }
    events
}

/// Convert the init-complete parameter bitmask into a [`DeviceMask`].
///
/// The wire mask differs from the inserted/removed mask: flash shows up
/// at bit 4, with no bit 3.
fn init_device_mask(mask: u8) -> DeviceMask {
    let mut devices = DeviceMask::EMPTY;
    if mask & 0x01 != 0 {
        devices = devices.with(Device::Usb);
    }
    if mask & 0x02 != 0 {
        devices = devices.with(Device::SdCard);
    }
    if mask & 0x04 != 0 {
        devices = devices.with(Device::Aux);
    }
    if mask & 0x10 != 0 {
        devices = devices.with(Device::Flash);
    }
    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(msg_id: u8, param: u16) -> Frame {
        Frame::assemble(msg_id, param, false)
    }

    // ---------------------------------------------------------------
    // Bitmask fan-out
    // ---------------------------------------------------------------

    #[test]
    fn device_inserted_fans_out_per_bit() {
        let events = decode(&inbound(NTF_DEVICE_INSERTED, 0x0003));
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            PlayerEvent::DeviceInserted { device: Device::Usb }
        ));
        assert!(matches!(
            events[1],
            PlayerEvent::DeviceInserted { device: Device::SdCard }
        ));
    }

    #[test]
    fn device_removed_single_bit() {
        let events = decode(&inbound(NTF_DEVICE_REMOVED, 0x0004));
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            PlayerEvent::DeviceRemoved { device: Device::Aux }
        ));
    }

    #[test]
    fn init_complete_mask_includes_flash_at_bit_4() {
        let events = decode(&inbound(NTF_INIT_COMPLETE, 0x0012));
        assert_eq!(events.len(), 1);
        match events[0] {
            PlayerEvent::InitComplete { devices } => {
                assert!(devices.contains(Device::SdCard));
                assert!(devices.contains(Device::Flash));
                assert!(!devices.contains(Device::Usb));
            }
            _ => panic!("expected InitComplete"),
        }
    }

    // ---------------------------------------------------------------
    // Status decoding
    // ---------------------------------------------------------------

    #[test]
    fn status_usb_playing() {
        let events = decode(&inbound(QRY_STATUS, 0x0101));
        assert!(matches!(
            events[0],
            PlayerEvent::Status {
                device: Device::Usb,
                state: ModuleState::Playing
            }
        ));
    }

    #[test]
    fn status_unknown_device_is_sleep() {
        let events = decode(&inbound(QRY_STATUS, 0x0F02));
        assert!(matches!(
            events[0],
            PlayerEvent::Status {
                device: Device::Sleep,
                state: ModuleState::Paused
            }
        ));
    }

    #[test]
    fn status_unknown_state_is_asleep() {
        let events = decode(&inbound(QRY_STATUS, 0x0207));
        assert!(matches!(
            events[0],
            PlayerEvent::Status {
                device: Device::SdCard,
                state: ModuleState::Asleep
            }
        ));
    }

    // ---------------------------------------------------------------
    // Replies and query responses
    // ---------------------------------------------------------------

    #[test]
    fn ack_and_error() {
        assert!(matches!(decode(&inbound(RSP_ACK, 0))[0], PlayerEvent::Ack));
        let events = decode(&inbound(RSP_ERROR, 0x0006));
        assert!(matches!(
            events[0],
            PlayerEvent::Error {
                code: ErrorCode::TrackNotFound
            }
        ));
    }

    #[test]
    fn track_finished_carries_device_and_index() {
        let events = decode(&inbound(NTF_FINISHED_SD_FILE, 42));
        assert!(matches!(
            events[0],
            PlayerEvent::TrackFinished {
                device: Device::SdCard,
                file_index: 42
            }
        ));
    }

    #[test]
    fn file_count_uses_full_param() {
        let events = decode(&inbound(QRY_USB_FILE_COUNT, 0x0123));
        assert!(matches!(
            events[0],
            PlayerEvent::FileCount {
                device: Device::Usb,
                count: 0x0123
            }
        ));
    }

    #[test]
    fn firmware_version_full_param() {
        let events = decode(&inbound(QRY_FIRMWARE_VERSION, 0x0205));
        assert!(matches!(
            events[0],
            PlayerEvent::FirmwareVersion { version: 0x0205 }
        ));
    }

    #[test]
    fn equalizer_response() {
        let events = decode(&inbound(QRY_EQ, 3));
        assert!(matches!(
            events[0],
            PlayerEvent::EqualizerChanged {
                eq: Some(Equalizer::Jazz)
            }
        ));
    }

    #[test]
    fn sequence_out_of_catalog_is_none() {
        let events = decode(&inbound(QRY_PLAYBACK_SEQUENCE, 9));
        assert!(matches!(
            events[0],
            PlayerEvent::SequenceChanged { sequence: None }
        ));
    }

    // ---------------------------------------------------------------
    // Tolerance
    // ---------------------------------------------------------------

    #[test]
    fn unknown_msg_id_decodes_to_nothing() {
        assert!(decode(&inbound(0x77, 0x1234)).is_empty());
        assert!(decode(&inbound(0x4A, 0)).is_empty());
    }
}
