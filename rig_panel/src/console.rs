//! Headless frontend: updates go to a writer as text or JSON lines, operator
//! gestures come in as typed commands.

use crate::app_state::UserIntent;
use crate::error::PanelError;
use crate::render::{element, jog_buttons, PanelVisibility, Renderer, UiUpdate};
use rig_protocol::JogDirection;
use std::io::Write;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct ConsoleRenderer<W> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_update(&mut self, update: &UiUpdate) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let line = serde_json::to_string(update)?;
                writeln!(self.out, "{line}")?;
            }
            OutputFormat::Text => writeln!(self.out, "{}", describe(update))?,
        }
        self.out.flush()
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn apply(&mut self, update: &UiUpdate) {
        if let Err(e) = self.write_update(update) {
            warn!(error = %e, "failed to write update");
        }
    }
}

fn describe(update: &UiUpdate) -> String {
    let target = update.target();
    match update {
        UiUpdate::Frame { frame } => format!("{target}: frame ({} bytes png)", frame.len()),
        UiUpdate::CameraList { cameras } => format!("{target}: [{}]", cameras.join(", ")),
        UiUpdate::CameraEntries { visible } => {
            format!("{target}: entries {}", if *visible { "shown" } else { "hidden" })
        }
        UiUpdate::Dropdown { layout } => format!(
            "{target}: height={}px padding={}px; {}: rotate({}deg)",
            layout.height_px,
            layout.padding_px,
            element::DROPDOWN_ICON,
            layout.icon_rotation_deg
        ),
        UiUpdate::SelectedCamera { label } => {
            format!("{target}: {}", label.as_deref().unwrap_or("<none>"))
        }
        UiUpdate::CoordinateX { value } | UiUpdate::CoordinateY { value } => {
            format!("{target}: {value}")
        }
        UiUpdate::Mode { mode } => {
            let v = PanelVisibility::for_mode(*mode);
            format!(
                "{target}: {mode:?}; {}={} {}={}",
                element::COORDINATE_PANEL,
                shown(v.coordinates),
                element::CONTROL_PANEL,
                shown(v.jog_controls)
            )
        }
        UiUpdate::Warning { description } => match description {
            Some(text) => format!("{target}.{}: {text}", element::WARNING_DESCRIPTION),
            None => format!("{target}: hidden"),
        },
        UiUpdate::Connection { connected } => format!(
            "{target}: {}",
            if *connected { "connected" } else { "disconnected" }
        ),
    }
}

fn shown(visible: bool) -> &'static str {
    if visible {
        "shown"
    } else {
        "hidden"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    Intent(UserIntent),
    Help,
    Quit,
}

pub const HELP: &str =
    "commands: dropdown | select <index> | manual | jog <f|b|l|r|u|d> | click <element-id> | help | quit";

/// Parses one operator line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleInput>, PanelError> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    let unknown = || PanelError::UnknownInput(line.trim().to_string());

    let input = match (cmd.to_ascii_lowercase().as_str(), arg) {
        ("dropdown", None) => ConsoleInput::Intent(UserIntent::ToggleDropdown),
        ("select", Some(index)) => {
            let index = index.parse::<usize>().map_err(|_| unknown())?;
            ConsoleInput::Intent(UserIntent::SelectCamera(index))
        }
        ("manual", None) => ConsoleInput::Intent(UserIntent::ToggleManual),
        ("jog", Some(code)) => {
            let mut chars = code.chars();
            let direction = match (chars.next(), chars.next()) {
                (Some(c), None) => JogDirection::from_code(c),
                _ => jog_by_name(code),
            }
            .ok_or_else(unknown)?;
            ConsoleInput::Intent(UserIntent::Jog(direction))
        }
        ("click", Some(id)) => ConsoleInput::Intent(click(id).ok_or_else(unknown)?),
        ("help", None) => ConsoleInput::Help,
        ("quit" | "exit", None) => ConsoleInput::Quit,
        _ => return Err(unknown()),
    };
    if words.next().is_some() {
        return Err(unknown());
    }
    Ok(Some(input))
}

/// Maps a clickable page element to the gesture it triggers.
fn click(id: &str) -> Option<UserIntent> {
    match id {
        element::DROPDOWN_BUTTON => Some(UserIntent::ToggleDropdown),
        element::MANUAL_TOGGLE => Some(UserIntent::ToggleManual),
        _ => jog_buttons()
            .find(|(_, button)| *button == id)
            .map(|(direction, _)| UserIntent::Jog(direction)),
    }
}

fn jog_by_name(name: &str) -> Option<JogDirection> {
    let name = name.to_ascii_lowercase();
    jog_buttons()
        .find(|(_, id)| id.trim_end_matches("-ctrl") == name)
        .map(|(direction, _)| direction)
}
