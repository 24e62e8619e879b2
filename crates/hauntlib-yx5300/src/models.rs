//! Audio module board definitions.
//!
//! Several vendors ship boards built around the YX5200/YX5300 chip
//! family, all speaking the same wire protocol but differing in which
//! storage devices exist and which queries the firmware bothers to
//! answer. Each supported board is described by a [`PlayerModel`] struct
//! returned from a factory function. The following boards are supported:
//!
//! | Board             | Chip       | Baud | Storage      | Version query |
//! |-------------------|------------|------|--------------|---------------|
//! | DFPlayer Mini     | YX5200-24SS| 9600 | SD, USB      | yes           |
//! | Catalex Serial MP3| YX5300     | 9600 | SD           | no (times out)|
//! | Flyron FN-M16P    | FN-M16P    | 9600 | SD, USB      | yes           |
//!
//! Clone boards generally behave like the DFPlayer Mini, minus the
//! checksum on the frames some of them send.

/// Static description of an audio module board.
///
/// Used by the builder for serial defaults, and useful to callers that
/// want to skip probing devices the board doesn't have.
#[derive(Debug, Clone)]
pub struct PlayerModel {
    /// Human-readable board name (e.g. "DFPlayer Mini").
    pub name: &'static str,
    /// The chip the board is built around.
    pub chip: &'static str,
    /// Default serial baud rate. The whole family runs at 9600 8N1.
    pub default_baud_rate: u32,
    /// Whether the board has a USB host port for thumb drives.
    pub has_usb_port: bool,
    /// Whether the board has an SD (TF) card slot.
    pub has_sd_slot: bool,
    /// Whether the firmware answers the firmware-version query.
    ///
    /// Boards that don't answer show up as a timeout during the
    /// initialization handshake; the handshake tolerates it.
    pub answers_version_query: bool,
}

/// The DFPlayer Mini, the most common board in prop controllers.
pub fn dfplayer_mini() -> PlayerModel {
    PlayerModel {
        name: "DFPlayer Mini",
        chip: "YX5200-24SS",
        default_baud_rate: 9600,
        has_usb_port: true,
        has_sd_slot: true,
        answers_version_query: true,
    }
}

/// The Catalex Serial MP3 Player, a YX5300 board with only an SD slot.
///
/// Does not respond to the firmware-version query.
pub fn catalex_yx5300() -> PlayerModel {
    PlayerModel {
        name: "Catalex Serial MP3 Player",
        chip: "YX5300",
        default_baud_rate: 9600,
        has_usb_port: false,
        has_sd_slot: true,
        answers_version_query: false,
    }
}

/// The Flyron FN-M16P, the board whose datasheet documents the protocol
/// most completely (including the status query response).
pub fn flyron_fn_m16p() -> PlayerModel {
    PlayerModel {
        name: "Flyron FN-M16P",
        chip: "FN-M16P",
        default_baud_rate: 9600,
        has_usb_port: true,
        has_sd_slot: true,
        answers_version_query: true,
    }
}

/// All board models known to this crate.
pub fn supported_players() -> Vec<PlayerModel> {
    vec![dfplayer_mini(), catalex_yx5300(), flyron_fn_m16p()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_family_runs_at_9600() {
        for model in supported_players() {
            assert_eq!(model.default_baud_rate, 9600, "{}", model.name);
        }
    }

    #[test]
    fn every_model_has_some_storage() {
        for model in supported_players() {
            assert!(model.has_usb_port || model.has_sd_slot, "{}", model.name);
        }
    }

    #[test]
    fn catalex_is_sd_only() {
        let model = catalex_yx5300();
        assert!(!model.has_usb_port);
        assert!(!model.answers_version_query);
    }
}
