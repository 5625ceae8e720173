use crate::dropdown::DropdownLayout;
use rig_protocol::{ControlMode, Frame, JogDirection};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Identities of the page elements the panel renders into.
pub mod element {
    use rig_protocol::JogDirection;

    pub const WEBCAM: &str = "webcam";
    pub const CAMERA_LIST: &str = "cameras";
    pub const SELECTED_CAMERA: &str = "camera-selector";
    pub const DROPDOWN_BUTTON: &str = "used-camera";
    pub const DROPDOWN_ICON: &str = "drop-button";
    pub const COORD_X: &str = "Cx";
    pub const COORD_Y: &str = "Cy";
    pub const MANUAL_TOGGLE: &str = "button";
    pub const COORDINATE_PANEL: &str = "coorddisp";
    pub const CONTROL_PANEL: &str = "controlPanel";
    pub const WARNING: &str = "warning";
    pub const WARNING_TITLE: &str = "title";
    pub const WARNING_DESCRIPTION: &str = "description";
    pub const CONNECTION: &str = "connection";

    pub const FORWARD_BUTTON: &str = "forward-ctrl";
    pub const BACKWARD_BUTTON: &str = "backward-ctrl";
    pub const LEFT_BUTTON: &str = "left-ctrl";
    pub const RIGHT_BUTTON: &str = "right-ctrl";
    pub const UP_BUTTON: &str = "up-ctrl";
    pub const DOWN_BUTTON: &str = "down-ctrl";

    /// Every element a rendering surface must provide before the panel starts.
    pub const REQUIRED: [&str; 20] = [
        WEBCAM,
        CAMERA_LIST,
        SELECTED_CAMERA,
        DROPDOWN_BUTTON,
        DROPDOWN_ICON,
        COORD_X,
        COORD_Y,
        MANUAL_TOGGLE,
        COORDINATE_PANEL,
        CONTROL_PANEL,
        WARNING,
        WARNING_TITLE,
        WARNING_DESCRIPTION,
        CONNECTION,
        FORWARD_BUTTON,
        BACKWARD_BUTTON,
        LEFT_BUTTON,
        RIGHT_BUTTON,
        UP_BUTTON,
        DOWN_BUTTON,
    ];

    pub fn jog_button(direction: JogDirection) -> &'static str {
        match direction {
            JogDirection::Forward => FORWARD_BUTTON,
            JogDirection::Backward => BACKWARD_BUTTON,
            JogDirection::Left => LEFT_BUTTON,
            JogDirection::Right => RIGHT_BUTTON,
            JogDirection::Up => UP_BUTTON,
            JogDirection::Down => DOWN_BUTTON,
        }
    }
}

/// One change to apply to the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "update")]
pub enum UiUpdate {
    Frame { frame: Frame },
    /// Rebuilds the dropdown entries. New entries start hidden.
    CameraList { cameras: Vec<String> },
    CameraEntries { visible: bool },
    Dropdown { layout: DropdownLayout },
    /// `None` when the index has no entry in the known list.
    SelectedCamera { label: Option<String> },
    CoordinateX { value: String },
    CoordinateY { value: String },
    Mode { mode: ControlMode },
    /// `None` hides the warning panel.
    Warning { description: Option<String> },
    Connection { connected: bool },
}

impl UiUpdate {
    /// The element the update is addressed to. Updates that also restyle
    /// other elements list them in [`UiUpdate::elements`].
    pub fn target(&self) -> &'static str {
        self.elements()[0]
    }

    /// Every element the update changes, primary element first.
    pub fn elements(&self) -> &'static [&'static str] {
        match self {
            UiUpdate::Frame { .. } => &[element::WEBCAM],
            UiUpdate::CameraList { .. } | UiUpdate::CameraEntries { .. } => {
                &[element::CAMERA_LIST]
            }
            UiUpdate::Dropdown { .. } => &[element::CAMERA_LIST, element::DROPDOWN_ICON],
            UiUpdate::SelectedCamera { .. } => &[element::SELECTED_CAMERA],
            UiUpdate::CoordinateX { .. } => &[element::COORD_X],
            UiUpdate::CoordinateY { .. } => &[element::COORD_Y],
            UiUpdate::Mode { .. } => &[
                element::MANUAL_TOGGLE,
                element::COORDINATE_PANEL,
                element::CONTROL_PANEL,
            ],
            UiUpdate::Warning {
                description: Some(_),
            } => &[element::WARNING, element::WARNING_DESCRIPTION],
            UiUpdate::Warning { description: None } => &[element::WARNING],
            UiUpdate::Connection { .. } => &[element::CONNECTION],
        }
    }
}

/// Which of the two mode panels is shown. Exactly one is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelVisibility {
    pub coordinates: bool,
    pub jog_controls: bool,
}

impl PanelVisibility {
    pub fn for_mode(mode: ControlMode) -> Self {
        let manual = mode == ControlMode::Manual;
        Self {
            coordinates: !manual,
            jog_controls: manual,
        }
    }
}

/// Rendering surface the controller drives.
pub trait Renderer {
    fn apply(&mut self, update: &UiUpdate);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn apply(&mut self, update: &UiUpdate) {
        (**self).apply(update)
    }
}

/// Keeps every update it receives; clones share the same log.
#[derive(Clone, Default)]
pub struct Recorder {
    updates: Arc<Mutex<Vec<UiUpdate>>>,
}

impl Recorder {
    pub fn updates(&self) -> Vec<UiUpdate> {
        self.updates.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut g) = self.updates.lock() {
            g.clear();
        }
    }
}

impl Renderer for Recorder {
    fn apply(&mut self, update: &UiUpdate) {
        if let Ok(mut g) = self.updates.lock() {
            g.push(update.clone());
        }
    }
}

/// Jog button element ids, in the order the panel lays them out.
pub fn jog_buttons() -> impl Iterator<Item = (JogDirection, &'static str)> {
    JogDirection::ALL
        .into_iter()
        .map(|d| (d, element::jog_button(d)))
}
