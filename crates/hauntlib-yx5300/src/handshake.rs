//! Initialization handshake.
//!
//! After a hardware reset the module needs a multi-step exchange before
//! it will play anything: wait for the chip to come back up, probe the
//! firmware version, enumerate files on USB and SD, select whichever
//! source has content, and read the folder count. Every step advances on
//! a specific inbound message id (or a synthesized timeout), so the
//! whole thing is modeled as a pure state machine: `transition` maps
//! (state, event) to a next state plus side effects, and [`Handshake`]
//! runs the cascade. Actual IO happens in the driver, which interprets
//! the returned [`Effect`]s.

use hauntlib_core::{Device, ErrorCode};
use tracing::debug;

use crate::commands::*;

/// Active step of the handshake. `None` in [`Handshake`] means no step
/// is active (never started, finished, or abandoned).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// Reset sent, waiting for the chip to announce it is back up.
    ResettingHardware,
    /// Firmware version probe. Some clone boards reply with an error
    /// instead; either answer advances.
    GettingVersion,
    CheckingUsbFileCount,
    CheckingSdFileCount,
    SelectingUsb,
    SelectingSd,
    CheckingFolderCount,
}

impl State {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            State::ResettingHardware => "resetting hardware",
            State::GettingVersion => "getting version",
            State::CheckingUsbFileCount => "checking USB file count",
            State::CheckingSdFileCount => "checking SD file count",
            State::SelectingUsb => "selecting USB",
            State::SelectingSd => "selecting SD",
            State::CheckingFolderCount => "checking folder count",
        }
    }
}

/// Which timeout window a handshake transmission arms. The driver maps
/// these to its configured durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Window {
    /// Ordinary reply window (200 ms by default).
    Command,
    /// Hardware reset window (10 s by default); the chip re-scans its
    /// filesystem before answering.
    Reset,
}

/// Side effect requested by a transition. Pure output; the driver
/// performs the IO and records the telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Effect {
    Send {
        msg_id: u8,
        param: u16,
        feedback: bool,
        window: Window,
    },
    SourceSelected(Device),
    FileCount(u16),
    FolderCount(u8),
    /// Handshake finished with a usable, selected source.
    Complete,
    /// Handshake gave up; the session is inert until reset() is called.
    Abandon { reason: &'static str },
}

/// Inbound event as the handshake sees it: a message id and its 16-bit
/// parameter. Timeouts arrive as an error message with the reserved
/// timed-out code; state entry uses a message id the wire never carries.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Event {
    pub msg_id: u8,
    pub param: u16,
}

impl Event {
    pub(crate) fn new(msg_id: u8, param: u16) -> Self {
        Event { msg_id, param }
    }

    fn enter() -> Self {
        Event {
            msg_id: ENTER_STATE,
            param: 0,
        }
    }

    fn is_error(&self) -> bool {
        self.msg_id == RSP_ERROR
    }

    fn is_timeout(&self) -> bool {
        self.is_error() && ErrorCode::from_raw(self.param) == ErrorCode::TimedOut
    }
}

struct Step {
    /// `None` is terminal; `Some(current)` means stay put.
    next: Option<State>,
    effects: Vec<Effect>,
}

impl Step {
    fn stay(state: State) -> Self {
        Step {
            next: Some(state),
            effects: Vec::new(),
        }
    }

    fn advance(next: State) -> Self {
        Step {
            next: Some(next),
            effects: Vec::new(),
        }
    }

    fn terminal() -> Self {
        Step {
            next: None,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

fn query(msg_id: u8) -> Effect {
    Effect::Send {
        msg_id,
        param: 0,
        feedback: false,
        window: Window::Command,
    }
}

/// One step of the handshake. Pure: no IO, no clock, no driver state.
fn transition(state: State, event: &Event) -> Step {
    match state {
        State::ResettingHardware => match event.msg_id {
            ENTER_STATE => Step::stay(state).with(Effect::Send {
                msg_id: CMD_RESET,
                param: 0,
                feedback: false,
                window: Window::Reset,
            }),
            NTF_INIT_COMPLETE => Step::advance(State::GettingVersion),
            _ if event.is_timeout() => Step::terminal().with(Effect::Abandon {
                reason: "no response to hardware reset",
            }),
            _ => Step::stay(state),
        },

        State::GettingVersion => match event.msg_id {
            ENTER_STATE => Step::stay(state).with(query(QRY_FIRMWARE_VERSION)),
            QRY_FIRMWARE_VERSION => Step::advance(State::CheckingUsbFileCount),
            // Tolerant skip: clones that don't implement the version
            // query answer with an error or not at all.
            _ if event.is_error() => Step::advance(State::CheckingUsbFileCount),
            _ => Step::stay(state),
        },

        State::CheckingUsbFileCount => match event.msg_id {
            ENTER_STATE => Step::stay(state).with(query(QRY_USB_FILE_COUNT)),
            QRY_USB_FILE_COUNT if event.param > 0 => Step::advance(State::SelectingUsb)
                .with(Effect::FileCount(event.param)),
            QRY_USB_FILE_COUNT => Step::advance(State::CheckingSdFileCount),
            _ if event.is_error() => Step::advance(State::CheckingSdFileCount),
            _ => Step::stay(state),
        },

        State::CheckingSdFileCount => match event.msg_id {
            ENTER_STATE => Step::stay(state).with(query(QRY_SD_FILE_COUNT)),
            QRY_SD_FILE_COUNT if event.param > 0 => Step::advance(State::SelectingSd)
                .with(Effect::FileCount(event.param)),
            QRY_SD_FILE_COUNT => Step::terminal().with(Effect::Abandon {
                reason: "no files on USB or SD",
            }),
            _ if event.is_error() => Step::terminal().with(Effect::Abandon {
                reason: "no usable source",
            }),
            _ => Step::stay(state),
        },

        State::SelectingUsb => select_source(state, event, Device::Usb),
        State::SelectingSd => select_source(state, event, Device::SdCard),

        State::CheckingFolderCount => match event.msg_id {
            ENTER_STATE => Step::stay(state).with(query(QRY_FOLDER_COUNT)),
            QRY_FOLDER_COUNT => Step::terminal()
                .with(Effect::FolderCount(event.param as u8))
                .with(Effect::Complete),
            _ => Step::stay(state),
        },
    }
}

fn select_source(state: State, event: &Event, device: Device) -> Step {
    match event.msg_id {
        ENTER_STATE => {
            // The gate only rejects AUX and sleep; USB and SD always map.
            let param = select_source_param(device).unwrap_or_default();
            Step::stay(state).with(Effect::Send {
                msg_id: CMD_SELECT_SOURCE,
                param,
                feedback: true,
                window: Window::Command,
            })
        }
        RSP_ACK => {
            Step::advance(State::CheckingFolderCount).with(Effect::SourceSelected(device))
        }
        _ => Step::stay(state),
    }
}

/// Cascade engine over the transition function.
///
/// Dispatching one event may run several states in a row: whenever the
/// active state changes, the new state immediately receives a synthetic
/// enter event, so e.g. an error in [`State::CheckingUsbFileCount`] both
/// switches to the SD check and fires its query in the same call. A
/// visited list stops an accidental cycle from looping forever.
#[derive(Debug, Default)]
pub(crate) struct Handshake {
    state: Option<State>,
}

impl Handshake {
    pub(crate) fn new() -> Self {
        Handshake { state: None }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state.is_some()
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> Option<State> {
        self.state
    }

    /// (Re)start the handshake from the top.
    pub(crate) fn start(&mut self) -> Vec<Effect> {
        self.state = Some(State::ResettingHardware);
        self.run(Event::enter())
    }

    /// Deliver an inbound event to the active state, if any.
    pub(crate) fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        if self.state.is_none() {
            return Vec::new();
        }
        self.run(event)
    }

    fn run(&mut self, event: Event) -> Vec<Effect> {
        let mut current = match self.state {
            Some(state) => state,
            None => return Vec::new(),
        };
        let mut effects = Vec::new();
        let mut visited = vec![current];
        let mut event = event;
        loop {
            let step = transition(current, &event);
            effects.extend(step.effects);
            match step.next {
                None => {
                    debug!(from = current.name(), "handshake over");
                    self.state = None;
                    return effects;
                }
                Some(next) if next == current => {
                    self.state = Some(current);
                    return effects;
                }
                Some(next) => {
                    if visited.contains(&next) {
                        // Cycle guard. No reachable transition loops, so
                        // hitting this means a bug; stop rather than spin.
                        debug!(state = next.name(), "handshake cycle detected");
                        self.state = Some(current);
                        return effects;
                    }
                    debug!(from = current.name(), to = next.name(), "handshake advance");
                    visited.push(next);
                    current = next;
                    event = Event::enter();
                }
            }
        }
    }
}
