use crate::dropdown::DropdownState;
use crate::render::UiUpdate;
use rig_protocol::{ControlMode, Frame, ServerMessage};
use tracing::{debug, warn};

/// Everything the panel shows that comes from the endpoint.
///
/// Only [`UiState::apply`] writes the server-owned fields; operator gestures
/// go out as requests and wait for the endpoint to echo the change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub frame: Option<Frame>,
    pub cameras: Vec<String>,
    pub selected_index: Option<i64>,
    pub mode: ControlMode,
    pub homing: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub connected: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the selected camera in the last known list, if any.
    pub fn selected_label(&self) -> Option<&str> {
        let index = usize::try_from(self.selected_index?).ok()?;
        self.cameras.get(index).map(String::as_str)
    }

    /// Applies one decoded message and returns the update to render.
    pub fn apply(&mut self, msg: ServerMessage, dropdown: DropdownState) -> Option<UiUpdate> {
        match msg {
            ServerMessage::Frame { frame } => {
                self.frame = Some(frame.clone());
                Some(UiUpdate::Frame { frame })
            }
            ServerMessage::CameraList { cameras } => {
                if dropdown == DropdownState::Open {
                    debug!("camera list ignored while the selector is open");
                    return None;
                }
                self.cameras = cameras.clone();
                Some(UiUpdate::CameraList { cameras })
            }
            ServerMessage::CoordinateX { value } => {
                self.x = Some(value.clone());
                Some(UiUpdate::CoordinateX { value })
            }
            ServerMessage::CoordinateY { value } => {
                self.y = Some(value.clone());
                Some(UiUpdate::CoordinateY { value })
            }
            ServerMessage::Mode { mode } => {
                self.mode = mode;
                Some(UiUpdate::Mode { mode })
            }
            ServerMessage::ActiveCamera { index } => {
                self.selected_index = Some(index);
                let label = self.selected_label().map(str::to_string);
                if label.is_none() {
                    warn!(
                        index,
                        known = self.cameras.len(),
                        "selected camera index has no entry in the camera list"
                    );
                }
                Some(UiUpdate::SelectedCamera { label })
            }
            ServerMessage::Homing { reason } => {
                self.homing = reason.clone();
                Some(UiUpdate::Warning {
                    description: reason,
                })
            }
        }
    }

    /// Returns an update only when the connection state actually changes.
    pub fn set_connected(&mut self, connected: bool) -> Option<UiUpdate> {
        if self.connected == connected {
            return None;
        }
        self.connected = connected;
        Some(UiUpdate::Connection { connected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> ServerMessage {
        ServerMessage::decode(text).unwrap()
    }

    fn seeded() -> UiState {
        let mut s = UiState::new();
        s.apply(decode("CASFront|Rear|Top"), DropdownState::Closed);
        s.apply(decode("CXD10"), DropdownState::Closed);
        s.apply(decode("CYD20"), DropdownState::Closed);
        s.apply(decode("CON1"), DropdownState::Closed);
        s.apply(decode("HOMLimit switch"), DropdownState::Closed);
        s
    }

    #[test]
    fn each_message_touches_only_its_field() {
        let cases: &[(&str, fn(&UiState) -> bool)] = &[
            ("CAMAAEC", |s| s.frame.is_some()),
            ("CASA|B", |s| s.cameras.len() == 2),
            ("CXD99", |s| s.x.as_deref() == Some("99")),
            ("CYD-1", |s| s.y.as_deref() == Some("-1")),
            ("MAN1", |s| s.mode == ControlMode::Manual),
            ("CON2", |s| s.selected_index == Some(2)),
            ("HOM0", |s| s.homing.is_none()),
        ];
        for (text, changed) in cases {
            let before = seeded();
            let mut after = before.clone();
            after.apply(decode(text), DropdownState::Closed);
            assert!(changed(&after), "{text} did not update its field");

            let mut restored = after.clone();
            match decode(text) {
                ServerMessage::Frame { .. } => restored.frame = before.frame.clone(),
                ServerMessage::CameraList { .. } => restored.cameras = before.cameras.clone(),
                ServerMessage::CoordinateX { .. } => restored.x = before.x.clone(),
                ServerMessage::CoordinateY { .. } => restored.y = before.y.clone(),
                ServerMessage::Mode { .. } => restored.mode = before.mode,
                ServerMessage::ActiveCamera { .. } => {
                    restored.selected_index = before.selected_index
                }
                ServerMessage::Homing { .. } => restored.homing = before.homing.clone(),
            }
            assert_eq!(restored, before, "{text} touched another field");
        }
    }

    #[test]
    fn camera_list_is_dropped_while_open() {
        let mut s = UiState::new();
        let update = s.apply(decode("CASFront|Rear|Top"), DropdownState::Closed);
        assert_eq!(s.cameras, ["Front", "Rear", "Top"]);
        assert!(matches!(update, Some(UiUpdate::CameraList { ref cameras }) if cameras.len() == 3));

        let update = s.apply(decode("CASOnly"), DropdownState::Open);
        assert_eq!(update, None);
        assert_eq!(s.cameras, ["Front", "Rear", "Top"]);
    }

    #[test]
    fn mode_message_swaps_panels() {
        let mut s = UiState::new();
        assert_eq!(
            s.apply(decode("MAN1"), DropdownState::Closed),
            Some(UiUpdate::Mode {
                mode: ControlMode::Manual
            })
        );
        assert_eq!(
            s.apply(decode("MAN0"), DropdownState::Closed),
            Some(UiUpdate::Mode {
                mode: ControlMode::Automatic
            })
        );
        assert_eq!(s.mode, ControlMode::Automatic);
    }

    #[test]
    fn homing_shows_then_hides_warning() {
        let mut s = UiState::new();
        assert_eq!(
            s.apply(decode("HOMObstruction detected"), DropdownState::Closed),
            Some(UiUpdate::Warning {
                description: Some("Obstruction detected".into())
            })
        );
        assert_eq!(s.homing.as_deref(), Some("Obstruction detected"));
        assert_eq!(
            s.apply(decode("HOM0"), DropdownState::Closed),
            Some(UiUpdate::Warning { description: None })
        );
        assert_eq!(s.homing, None);
    }

    #[test]
    fn selected_label_follows_the_known_list() {
        let mut s = seeded();
        assert_eq!(s.selected_label(), Some("Rear"));

        let update = s.apply(decode("CON5"), DropdownState::Closed);
        assert_eq!(update, Some(UiUpdate::SelectedCamera { label: None }));
        assert_eq!(s.selected_index, Some(5));

        let update = s.apply(decode("CON-1"), DropdownState::Closed);
        assert_eq!(update, Some(UiUpdate::SelectedCamera { label: None }));
    }

    #[test]
    fn selected_label_without_any_list_is_absent() {
        let mut s = UiState::new();
        let update = s.apply(decode("CON0"), DropdownState::Closed);
        assert_eq!(update, Some(UiUpdate::SelectedCamera { label: None }));
    }

    #[test]
    fn connection_updates_only_on_change() {
        let mut s = UiState::new();
        assert_eq!(
            s.set_connected(true),
            Some(UiUpdate::Connection { connected: true })
        );
        assert_eq!(s.set_connected(true), None);
        assert_eq!(
            s.set_connected(false),
            Some(UiUpdate::Connection { connected: false })
        );
    }
}
