use crate::app_state::{LinkCommand, LinkEvent, UserIntent};
use crate::dropdown::Dropdown;
use crate::error::PanelError;
use crate::render::{Renderer, UiUpdate};
use crate::state::UiState;
use rig_protocol::{ClientCommand, JogDirection, ProtocolError, ServerMessage};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Owns the UI state and applies link events and operator intents to it,
/// one at a time.
pub struct PanelController<R> {
    state: UiState,
    dropdown: Dropdown,
    renderer: R,
    link: mpsc::Sender<LinkCommand>,
}

impl<R: Renderer> PanelController<R> {
    pub fn new(renderer: R, link: mpsc::Sender<LinkCommand>, reveal_delay: Duration) -> Self {
        let mut controller = Self {
            state: UiState::new(),
            dropdown: Dropdown::new(reveal_delay),
            renderer,
            link,
        };
        // Initial layout pass; lands on Closed.
        controller.toggle_dropdown();
        controller
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn dropdown(&self) -> &Dropdown {
        &self.dropdown
    }

    pub fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected => {
                let update = self.state.set_connected(true);
                self.render(update);
            }
            LinkEvent::Disconnected => {
                let update = self.state.set_connected(false);
                self.render(update);
            }
            LinkEvent::Message(text) => self.handle_message(&text),
        }
    }

    pub fn handle_message(&mut self, text: &str) {
        let msg = match ServerMessage::decode(text) {
            Ok(msg) => msg,
            Err(ProtocolError::UnknownTag(tag)) => {
                debug!(%tag, "ignoring message with unknown tag");
                return;
            }
            Err(e) => {
                warn!(error = %e, "dropping malformed message");
                return;
            }
        };
        let update = self.state.apply(msg, self.dropdown.state());
        self.render(update);
    }

    pub fn handle_intent(&mut self, intent: UserIntent) -> Result<(), PanelError> {
        match intent {
            UserIntent::ToggleDropdown => {
                self.toggle_dropdown();
                Ok(())
            }
            UserIntent::SelectCamera(index) => self.select_camera(index),
            UserIntent::ToggleManual => self.toggle_manual(),
            UserIntent::Jog(direction) => self.jog(direction),
        }
    }

    pub fn toggle_dropdown(&mut self) {
        let updates = self
            .dropdown
            .toggle(self.state.cameras.len(), Instant::now());
        self.render(updates);
    }

    /// Requests camera `index` and closes the selector without waiting for
    /// the endpoint to confirm.
    pub fn select_camera(&mut self, index: usize) -> Result<(), PanelError> {
        let sent = self.send(ClientCommand::SelectCamera { index });
        let updates = self.dropdown.close();
        self.render(updates);
        sent
    }

    /// Requests the inverse of the last confirmed mode. The local flag is
    /// left alone until the endpoint echoes `MAN`.
    pub fn toggle_manual(&mut self) -> Result<(), PanelError> {
        self.send(ClientCommand::SetMode {
            mode: self.state.mode.toggled(),
        })
    }

    pub fn jog(&mut self, direction: JogDirection) -> Result<(), PanelError> {
        self.send(ClientCommand::Jog { direction })
    }

    pub fn fire_reveal(&mut self) {
        let update = self.dropdown.fire_reveal(Instant::now());
        self.render(update);
    }

    /// Processes events until shutdown, or until either channel closes.
    /// Returns the controller so callers can inspect the final state.
    pub async fn run(
        mut self,
        mut intents: mpsc::Receiver<UserIntent>,
        mut events: mpsc::Receiver<LinkEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        loop {
            let reveal = self.dropdown.reveal_deadline();
            tokio::select! {
                // Teardown wins over queued work.
                biased;
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle_link_event(event),
                    None => break,
                },
                intent = intents.recv() => match intent {
                    Some(intent) => {
                        if let Err(e) = self.handle_intent(intent) {
                            warn!(?intent, error = %e, "operator request not sent");
                        }
                    }
                    None => break,
                },
                _ = sleep_until(reveal) => self.fire_reveal(),
            }
        }
        self.dropdown.cancel_reveal();
        info!("panel controller stopped");
        self
    }

    fn send(&self, cmd: ClientCommand) -> Result<(), PanelError> {
        if !self.state.connected {
            return Err(PanelError::NotConnected);
        }
        self.link
            .try_send(LinkCommand::Send(cmd))
            .map_err(|e| match e {
                TrySendError::Full(_) => PanelError::LinkBusy,
                TrySendError::Closed(_) => PanelError::LinkClosed,
            })
    }

    fn render(&mut self, updates: impl IntoIterator<Item = UiUpdate>) {
        for update in updates {
            self.renderer.apply(&update);
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
