//! Controller: the single owner of status, encoder, transfer buffer, player
//! and stored macro.
//!
//! Everything that happens to the device arrives as a [`DeviceEvent`] through
//! [`Controller::handle`]; playback timing advances through
//! [`Controller::poll`]. Both run on the one control loop, so nothing here
//! needs a lock.

use switch_proto::{parse_live_frame, Macro};

use crate::encoder::HidEncoder;
use crate::ingest::{Message, TransferBuffer};
use crate::output::HidOutput;
use crate::player::{MacroPlayer, Step};
use crate::status::{DeviceStatus, StatusCell};
use crate::storage::MacroStore;

/// Input to the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceEvent<'a> {
    /// The wireless link came up.
    LinkUp,
    /// The wireless link dropped.
    LinkDown,
    /// One message written by the remote side.
    Message(&'a [u8]),
    /// Debounced press of the start/stop button.
    ButtonPressed,
}

pub struct Controller<H, S> {
    status: StatusCell,
    encoder: HidEncoder<H>,
    store: S,
    transfer: TransferBuffer,
    player: MacroPlayer,
    current: Option<Macro>,
    /// The host has not received the current report.
    unsent: bool,
}

impl<H: HidOutput, S: MacroStore> Controller<H, S> {
    /// Create a controller in [`DeviceStatus::Idle`] with no macro loaded.
    pub fn new(output: H, store: S) -> Self {
        Self {
            status: StatusCell::new(),
            encoder: HidEncoder::new(output),
            store,
            transfer: TransferBuffer::new(),
            player: MacroPlayer::new(),
            current: None,
            unsent: false,
        }
    }

    /// Load the stored macro, if any, and go to [`DeviceStatus::Ready`].
    ///
    /// A missing, unreadable or invalid blob leaves the device idle.
    pub fn restore(&mut self) {
        if !self.store.exists() {
            info!("No stored macro");
            return;
        }

        let loaded = self.store.load(self.transfer.scratch());
        let len = match loaded {
            Ok(len) => len,
            Err(e) => {
                error!("Stored macro unreadable: {}", e);
                self.transfer.begin();
                return;
            }
        };
        self.transfer.truncate(len);

        match self.transfer.document().and_then(Macro::parse) {
            Ok(restored) => {
                info!("Restored macro, {} events", restored.len());
                self.install(restored);
            }
            Err(e) => error!("Stored macro invalid: {}", e),
        }
        self.transfer.begin();
    }

    /// Dispatch one event.
    pub async fn handle(&mut self, event: DeviceEvent<'_>, now_ms: u32) {
        match event {
            DeviceEvent::LinkUp => {
                if self.status.get() == DeviceStatus::Idle {
                    self.status.set(DeviceStatus::Connected);
                }
            }
            DeviceEvent::LinkDown => {
                if !self.status.get().survives_link_loss() {
                    self.status.set(DeviceStatus::Idle);
                }
            }
            DeviceEvent::Message(raw) => self.on_message(raw).await,
            DeviceEvent::ButtonPressed => self.on_button(now_ms).await,
        }
    }

    async fn on_message(&mut self, raw: &[u8]) {
        match Message::classify(raw) {
            Message::Live(frame) => match parse_live_frame(frame) {
                Ok(frame) => {
                    self.encoder.apply_live(&frame);
                    self.unsent = true;
                    self.flush().await;
                }
                Err(e) => warn!("Bad live frame: {}", e),
            },
            Message::Start { announced_len } => {
                if self.status.get().is_playback() {
                    self.player.stop(&mut self.encoder).await;
                }
                if let Some(len) = announced_len {
                    debug!("Transfer start, {} bytes announced", len);
                }
                self.transfer.begin();
                self.status.set(DeviceStatus::Transferring);
            }
            Message::End => {
                if self.status.get() == DeviceStatus::Transferring {
                    self.finish_transfer();
                } else {
                    warn!("END without transfer in {}", self.status.get());
                }
            }
            Message::Chunk(chunk) => {
                if self.status.get() != DeviceStatus::Transferring {
                    return;
                }
                if let Err(e) = self.transfer.append(chunk) {
                    warn!("Chunk dropped: {}", e);
                }
            }
        }
    }

    fn finish_transfer(&mut self) {
        let parsed = self
            .transfer
            .document()
            .and_then(|document| Macro::parse(document).map(|m| (m, document)));

        match parsed {
            Ok((received, document)) => {
                info!(
                    "Macro received, {} events, {} bytes",
                    received.len(),
                    document.len()
                );
                if let Err(e) = self.store.save(document) {
                    error!("Macro not persisted: {}", e);
                }
                self.install(received);
            }
            Err(e) => {
                error!("Macro rejected: {}", e);
                self.status.set(DeviceStatus::Error);
            }
        }
    }

    fn install(&mut self, loaded: Macro) {
        self.current = Some(loaded);
        self.player.load_settings(self.current.as_ref());
        self.status.set(DeviceStatus::Ready);
    }

    async fn on_button(&mut self, now_ms: u32) {
        let status = self.status.get();
        if status.is_playback() {
            self.player.stop(&mut self.encoder).await;
            self.status.set(DeviceStatus::Ready);
        } else if status.can_start_playback() {
            if self.current.is_none() {
                info!("No macro loaded");
                return;
            }
            self.player.load_settings(self.current.as_ref());
            self.player.start(now_ms);
            self.status.set(DeviceStatus::Playing);
        } else {
            debug!("Button ignored in {}", status);
        }
    }

    /// Advance playback timing. Call once per control loop iteration.
    pub async fn poll(&mut self, now_ms: u32) {
        match self.status.get() {
            DeviceStatus::Playing => {
                let Some(playing) = self.current.as_ref() else {
                    self.status.set(DeviceStatus::Ready);
                    return;
                };
                let step = self
                    .player
                    .tick(now_ms, &playing.events, &mut self.encoder)
                    .await;
                match step {
                    Step::Pending => self.flush().await,
                    Step::Retry => {}
                    Step::Sent(_) => self.unsent = false,
                    Step::Restarted => {
                        self.unsent = false;
                        debug!("Next pass");
                    }
                    Step::Waiting => {
                        self.unsent = false;
                        self.status.set(DeviceStatus::Waiting);
                    }
                    Step::Finished => {
                        self.unsent = false;
                        info!("Playback finished");
                        self.status.set(DeviceStatus::Ready);
                    }
                }
            }
            DeviceStatus::Waiting => {
                if self.player.resume_if_due(now_ms) {
                    self.status.set(DeviceStatus::Playing);
                } else {
                    self.flush().await;
                }
            }
            _ => self.flush().await,
        }
    }

    /// Resend the current report if the host missed it.
    async fn flush(&mut self) {
        if !self.unsent {
            return;
        }
        match self.encoder.send().await {
            Ok(()) => self.unsent = false,
            Err(e) => trace!("Report deferred: {}", e),
        }
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        self.status.get()
    }

    /// Return the status if it changed since the last call.
    pub fn take_status_change(&mut self) -> Option<DeviceStatus> {
        self.status.take_change()
    }

    /// The macro currently loaded.
    pub fn current_macro(&self) -> Option<&Macro> {
        self.current.as_ref()
    }

    pub fn player(&self) -> &MacroPlayer {
        &self.player
    }

    /// Get a reference to the encoder.
    pub fn encoder(&self) -> &HidEncoder<H> {
        &self.encoder
    }

    /// Get a mutable reference to the encoder.
    pub fn encoder_mut(&mut self) -> &mut HidEncoder<H> {
        &mut self.encoder
    }

    /// Get a reference to the macro store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
