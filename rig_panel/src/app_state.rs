use rig_protocol::{ClientCommand, JogDirection};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Channels a frontend holds to drive a running panel.
#[derive(Clone)]
pub struct AppState {
    pub intents: mpsc::Sender<UserIntent>,
    pub shutdown: CancellationToken,
}

/// Operator gestures. None of them touch server-owned state directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIntent {
    ToggleDropdown,
    SelectCamera(usize),
    ToggleManual,
    Jog(JogDirection),
}

pub enum LinkCommand {
    Send(ClientCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
    Message(String),
}
