//! The YX5200/YX5300 protocol driver.
//!
//! [`Yx5300Player`] owns the transport, the receive frame, the
//! initialization handshake, and the reply deadline. It is deliberately
//! single-owner and poll-driven: the module speaks a half-duplex
//! request/response protocol with at most one expectation in flight, so
//! there is nothing to gain from a background IO task. Call
//! [`poll`](Yx5300Player::poll) from your control loop; each call drains
//! buffered serial bytes, dispatches any completed frames, and fires the
//! reply timeout if it has expired.
//!
//! Decoded traffic is published as [`PlayerEvent`]s on a broadcast
//! channel; subscribe before issuing commands to see their replies.

use tokio::sync::broadcast;
use tokio::time::Duration;
use tracing::{debug, info, trace, warn};

use hauntlib_core::{Device, Equalizer, Error, ErrorCode, PlayerEvent, Result, Transport};

use crate::commands::*;
use crate::frame::Frame;
use crate::handshake::{self, Effect, Handshake, Window};
use crate::timeout::TimeoutSupervisor;

/// Default reply window for a command or query.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(200);

/// Default window for the hardware reset, which re-scans the filesystem
/// on every attached device before answering.
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(10);

/// Broadcast channel capacity for player events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Driver for a YX5200/YX5300-family serial audio module.
///
/// Constructed via [`Yx5300PlayerBuilder`](crate::Yx5300PlayerBuilder) or
/// [`Yx5300Player::new`] for the defaults. After construction, call
/// [`reset`](Self::reset) to start the initialization handshake, then
/// [`poll`](Self::poll) repeatedly; once
/// [`PlayerEvent::HandshakeComplete`] arrives the module has a selected
/// source and is ready for arbitrary commands.
pub struct Yx5300Player {
    transport: Box<dyn Transport>,
    /// Reusable receive frame, progressively filled as bytes arrive.
    inbound: Frame,
    event_tx: broadcast::Sender<PlayerEvent>,
    handshake: Handshake,
    timeout: TimeoutSupervisor,
    command_timeout: Duration,
    reset_timeout: Duration,

    // Session telemetry, written only from handshake effects.
    selected_source: Option<Device>,
    file_count: u16,
    folder_count: u8,
}

impl Yx5300Player {
    /// Create a driver over `transport` with the default reply windows.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::with_timeouts(transport, DEFAULT_COMMAND_TIMEOUT, DEFAULT_RESET_TIMEOUT)
    }

    pub(crate) fn with_timeouts(
        transport: Box<dyn Transport>,
        command_timeout: Duration,
        reset_timeout: Duration,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Yx5300Player {
            transport,
            inbound: Frame::new(),
            event_tx,
            handshake: Handshake::new(),
            timeout: TimeoutSupervisor::new(),
            command_timeout,
            reset_timeout,
            selected_source: None,
            file_count: 0,
            folder_count: 0,
        }
    }

    /// Subscribe to decoded player events.
    ///
    /// Delivery is best-effort through a bounded channel; a subscriber
    /// that falls far behind will see `Lagged` and miss events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    // ---------------------------------------------------------------
    // Polling
    // ---------------------------------------------------------------

    /// Process pending serial traffic and the reply deadline.
    ///
    /// Drains whatever bytes the transport has buffered (without
    /// waiting), feeds them through the frame decoder, and dispatches
    /// each completed frame. If the reply deadline has passed, a
    /// synthetic error with [`ErrorCode::TimedOut`] is delivered through
    /// the same dispatch path as real traffic, so the handshake reacts
    /// to silence exactly as it would to a reported error.
    ///
    /// Call this often; long gaps between polls lengthen effective reply
    /// latency and risk spurious timeouts.
    pub async fn poll(&mut self) -> Result<()> {
        let mut buf = [0u8; 32];
        loop {
            match self.transport.receive(&mut buf, Duration::ZERO).await {
                Ok(0) => break,
                Ok(n) => {
                    trace!(bytes = n, "read");
                    for i in 0..n {
                        if self.inbound.push(buf[i]) {
                            let frame = self.inbound;
                            // Start fresh so a completed 8-byte frame
                            // can't be mistaken for a partial one.
                            self.inbound = Frame::new();
                            self.handle_frame(&frame).await?;
                        }
                    }
                }
                Err(Error::Timeout) => break,
                Err(e) => return Err(e),
            }
        }

        if self.timeout.expired() {
            warn!("reply window expired");
            let synthetic = Frame::assemble(RSP_ERROR, ErrorCode::TimedOut.raw(), false);
            self.deliver(&synthetic).await?;
        }
        Ok(())
    }

    async fn handle_frame(&mut self, frame: &Frame) -> Result<()> {
        self.emit(PlayerEvent::FrameReceived {
            bytes: frame.bytes().to_vec(),
        });
        if !frame.is_valid() {
            warn!(bytes = ?frame.bytes(), "invalid frame");
            self.emit(PlayerEvent::InvalidFrame);
            return Ok(());
        }
        debug!(
            msg_id = format_args!("{:#04x}", frame.msg_id()),
            param = frame.param(),
            "frame received"
        );
        // Outside the handshake a valid frame satisfies the outstanding
        // expectation. During the handshake the timer is left to the
        // rearm discipline (each state rearms when it sends), so a stray
        // notification can't silently disarm the reset window.
        if !self.handshake.is_active() {
            self.timeout.cancel();
        }
        self.deliver(frame).await
    }

    /// Route a valid (or synthesized) frame: notifier first, then the
    /// handshake state machine, then whatever IO the handshake asked for.
    async fn deliver(&mut self, frame: &Frame) -> Result<()> {
        for event in crate::notify::decode(frame) {
            trace!(?event, "event");
            self.emit(event);
        }
        let effects = self
            .handshake
            .dispatch(handshake::Event::new(frame.msg_id(), frame.param()));
        self.apply_effects(effects).await
    }

    async fn apply_effects(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::Send {
                    msg_id,
                    param,
                    feedback,
                    window,
                } => {
                    let window = match window {
                        Window::Command => self.command_timeout,
                        Window::Reset => self.reset_timeout,
                    };
                    self.transmit_with_window(msg_id, param, feedback, window)
                        .await?;
                }
                Effect::SourceSelected(device) => {
                    info!(%device, "source selected");
                    self.selected_source = Some(device);
                }
                Effect::FileCount(count) => self.file_count = count,
                Effect::FolderCount(count) => self.folder_count = count,
                Effect::Complete => {
                    // The folder-count query armed a window nothing will
                    // answer again; drop it so the session starts quiet.
                    self.timeout.cancel();
                    if let Some(source) = self.selected_source {
                        info!(
                            %source,
                            files = self.file_count,
                            folders = self.folder_count,
                            "handshake complete"
                        );
                        self.emit(PlayerEvent::HandshakeComplete {
                            source,
                            files: self.file_count,
                            folders: self.folder_count as u16,
                        });
                    }
                }
                Effect::Abandon { reason } => {
                    warn!(reason, "handshake abandoned");
                    self.timeout.cancel();
                    self.emit(PlayerEvent::HandshakeAbandoned);
                }
            }
        }
        Ok(())
    }

    fn emit(&self, event: PlayerEvent) {
        // A send error just means nobody is subscribed.
        let _ = self.event_tx.send(event);
    }

    // ---------------------------------------------------------------
    // Transmission
    // ---------------------------------------------------------------

    async fn transmit(&mut self, msg_id: u8, param: u16, feedback: bool) -> Result<()> {
        self.transmit_with_window(msg_id, param, feedback, self.command_timeout)
            .await
    }

    async fn transmit_with_window(
        &mut self,
        msg_id: u8,
        param: u16,
        feedback: bool,
        window: Duration,
    ) -> Result<()> {
        let frame = Frame::assemble(msg_id, param, feedback);
        debug!(
            msg_id = format_args!("{msg_id:#04x}"),
            param, feedback, "transmit"
        );
        self.transport.send(frame.bytes()).await?;
        self.emit(PlayerEvent::FrameSent {
            bytes: frame.bytes().to_vec(),
        });
        // One expectation at a time: rearming replaces any pending window.
        self.timeout.arm(window);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Initialization
    // ---------------------------------------------------------------

    /// Reset the hardware and start the initialization handshake.
    ///
    /// The handshake runs inside subsequent [`poll`](Self::poll) calls:
    /// reset, firmware probe, USB/SD file enumeration, source selection,
    /// folder count. It ends with either
    /// [`PlayerEvent::HandshakeComplete`] or
    /// [`PlayerEvent::HandshakeAbandoned`]; after an abandon the driver
    /// stays inert until `reset` is called again.
    pub async fn reset(&mut self) -> Result<()> {
        info!("starting initialization handshake");
        self.selected_source = None;
        self.file_count = 0;
        self.folder_count = 0;
        let effects = self.handshake.start();
        self.apply_effects(effects).await
    }

    /// Whether the initialization handshake is still in progress.
    pub fn handshake_active(&self) -> bool {
        self.handshake.is_active()
    }

    /// The source the handshake selected, if it completed.
    pub fn selected_source(&self) -> Option<Device> {
        self.selected_source
    }

    /// File count on the selected source (0 before the handshake ends).
    pub fn file_count(&self) -> u16 {
        self.file_count
    }

    /// Folder count on the selected source.
    pub fn folder_count(&self) -> u8 {
        self.folder_count
    }

    // ---------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------

    /// Play the next file on the selected source.
    pub async fn play_next(&mut self) -> Result<()> {
        self.transmit(CMD_PLAY_NEXT, 0, true).await
    }

    /// Play the previous file on the selected source.
    pub async fn play_previous(&mut self) -> Result<()> {
        self.transmit(CMD_PLAY_PREVIOUS, 0, true).await
    }

    /// Play a file by its index in filesystem order.
    pub async fn play_file(&mut self, file_index: u16) -> Result<()> {
        self.transmit(CMD_PLAY_FILE, file_index, true).await
    }

    /// Play a track by folder and track number prefix.
    ///
    /// Folders are named `01`..`99` and tracks carry a numeric prefix.
    /// The wire protocol has two incompatible addressing schemes: tracks
    /// below 256 go out as `folder<<8 | track`, larger track numbers (up
    /// to 3000, folders up to 15) as `folder<<12 | track`. A combination
    /// neither scheme can express is silently dropped, matching the
    /// module's own behavior of not reporting anything useful for it.
    pub async fn play_track(&mut self, folder: u16, track: u16) -> Result<()> {
        match play_track_message(folder, track) {
            Some((msg_id, param)) => self.transmit(msg_id, param, true).await,
            None => {
                debug!(folder, track, "track not addressable, dropped");
                Ok(())
            }
        }
    }

    /// Play a file from the `MP3` folder by its numeric name.
    pub async fn play_mp3_file(&mut self, file: u16) -> Result<()> {
        self.transmit(CMD_PLAY_FROM_MP3, file, true).await
    }

    /// Interrupt the current track with a file from the `ADVERT` folder;
    /// the interrupted track resumes afterward.
    pub async fn insert_advert(&mut self, file: u16) -> Result<()> {
        self.transmit(CMD_INSERT_ADVERT, file, true).await
    }

    /// Stop an inserted advert and resume the interrupted track.
    pub async fn stop_advert(&mut self) -> Result<()> {
        self.transmit(CMD_STOP_ADVERT, 0, true).await
    }

    /// Pause playback.
    pub async fn pause(&mut self) -> Result<()> {
        self.transmit(CMD_PAUSE, 0, true).await
    }

    /// Resume paused playback.
    pub async fn resume(&mut self) -> Result<()> {
        self.transmit(CMD_UNPAUSE, 0, true).await
    }

    /// Stop playback.
    pub async fn stop(&mut self) -> Result<()> {
        self.transmit(CMD_STOP, 0, true).await
    }

    /// Set the volume, clamped to the 0-30 range the hardware accepts.
    pub async fn set_volume(&mut self, volume: i16) -> Result<()> {
        self.transmit(CMD_SET_VOLUME, clamp_volume(volume), true).await
    }

    /// Select an equalizer preset.
    pub async fn select_eq(&mut self, eq: Equalizer) -> Result<()> {
        self.transmit(CMD_SELECT_EQ, eq.raw(), true).await
    }

    /// Loop a single file by index.
    pub async fn loop_file(&mut self, file_index: u16) -> Result<()> {
        self.transmit(CMD_LOOP_FILE, file_index, true).await
    }

    /// Loop every file on the selected source.
    pub async fn loop_all(&mut self, enable: bool) -> Result<()> {
        self.transmit(CMD_LOOP_ALL, enable as u16, true).await
    }

    /// Loop every file in a folder.
    pub async fn loop_folder(&mut self, folder: u16) -> Result<()> {
        self.transmit(CMD_LOOP_FOLDER, folder, true).await
    }

    /// Play all files on the selected source in random order.
    pub async fn random_play(&mut self) -> Result<()> {
        self.transmit(CMD_RANDOM_PLAY, 0, true).await
    }

    /// Select the source device to play from.
    ///
    /// Only USB, SD card, and flash exist on the wire; other devices are
    /// silently ignored.
    pub async fn select_source(&mut self, device: Device) -> Result<()> {
        match select_source_param(device) {
            Some(param) => self.transmit(CMD_SELECT_SOURCE, param, true).await,
            None => {
                debug!(%device, "not a selectable source, dropped");
                Ok(())
            }
        }
    }

    /// Put the module into low-power sleep.
    pub async fn sleep(&mut self) -> Result<()> {
        self.transmit(CMD_SLEEP, 0, true).await
    }

    /// Wake the module from sleep.
    pub async fn wake(&mut self) -> Result<()> {
        self.transmit(CMD_WAKE, 0, true).await
    }

    /// Enable or disable the DAC output.
    pub async fn set_dac_enabled(&mut self, enabled: bool) -> Result<()> {
        self.transmit(CMD_DISABLE_DAC, (!enabled) as u16, true).await
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------
    //
    // Queries never request feedback: the response itself is the
    // acknowledgment. Answers arrive as PlayerEvents in a later poll.

    /// Query playback status; answered by [`PlayerEvent::Status`].
    pub async fn query_status(&mut self) -> Result<()> {
        self.transmit(QRY_STATUS, 0, false).await
    }

    /// Query the volume; answered by [`PlayerEvent::Volume`].
    pub async fn query_volume(&mut self) -> Result<()> {
        self.transmit(QRY_VOLUME, 0, false).await
    }

    /// Query the equalizer preset; answered by
    /// [`PlayerEvent::EqualizerChanged`].
    pub async fn query_eq(&mut self) -> Result<()> {
        self.transmit(QRY_EQ, 0, false).await
    }

    /// Query the playback sequence; answered by
    /// [`PlayerEvent::SequenceChanged`].
    pub async fn query_sequence(&mut self) -> Result<()> {
        self.transmit(QRY_PLAYBACK_SEQUENCE, 0, false).await
    }

    /// Query the firmware version; answered by
    /// [`PlayerEvent::FirmwareVersion`]. Some clone boards answer with an
    /// error or not at all.
    pub async fn query_firmware_version(&mut self) -> Result<()> {
        self.transmit(QRY_FIRMWARE_VERSION, 0, false).await
    }

    /// Query the file count on a device; answered by
    /// [`PlayerEvent::FileCount`]. Devices without storage are silently
    /// ignored.
    pub async fn query_file_count(&mut self, device: Device) -> Result<()> {
        match file_count_query(device) {
            Some(msg_id) => self.transmit(msg_id, 0, false).await,
            None => Ok(()),
        }
    }

    /// Query the current file index on a device; answered by
    /// [`PlayerEvent::CurrentTrack`].
    pub async fn query_current_file(&mut self, device: Device) -> Result<()> {
        match current_file_query(device) {
            Some(msg_id) => self.transmit(msg_id, 0, false).await,
            None => Ok(()),
        }
    }

    /// Query the number of tracks in a folder; answered by
    /// [`PlayerEvent::FolderTrackCount`].
    pub async fn query_folder_track_count(&mut self, folder: u16) -> Result<()> {
        self.transmit(QRY_FOLDER_TRACK_COUNT, folder, false).await
    }

    /// Query the number of folders on the current device; answered by
    /// [`PlayerEvent::FolderCount`].
    pub async fn query_folder_count(&mut self) -> Result<()> {
        self.transmit(QRY_FOLDER_COUNT, 0, false).await
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Close the underlying transport.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    /// Whether the underlying transport is connected.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }
}

impl std::fmt::Debug for Yx5300Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Yx5300Player")
            .field("selected_source", &self.selected_source)
            .field("file_count", &self.file_count)
            .field("folder_count", &self.folder_count)
            .field("handshake_active", &self.handshake.is_active())
            .finish()
    }
}
