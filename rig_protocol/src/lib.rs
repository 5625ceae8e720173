use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Every message starts with a fixed-width type tag; the rest is the payload.
pub const TAG_LEN: usize = 3;

/// Separator between camera names in a `CAS` payload.
pub const CAMERA_DELIMITER: char = '|';

pub mod tag {
    pub const FRAME: &str = "CAM";
    pub const CAMERA_LIST: &str = "CAS";
    pub const COORD_X: &str = "CXD";
    pub const COORD_Y: &str = "CYD";
    pub const MODE: &str = "MAN";
    pub const ACTIVE_CAMERA: &str = "CON";
    pub const HOMING: &str = "HOM";

    pub const SELECT_CAMERA: &str = "CAM";
    pub const JOG: &str = "CTR";
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("message shorter than its 3-character tag")]
    TooShort,
    #[error("unknown message tag {0:?}")]
    UnknownTag(String),
    #[error("invalid {tag} payload: {reason}")]
    InvalidPayload { tag: &'static str, reason: String },
    #[error("invalid base64 frame: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// The rig tracks targets on its own; wire value `0`.
    #[default]
    Automatic,
    /// The operator jogs the rig; wire value `1`.
    Manual,
}

impl ControlMode {
    pub fn wire(self) -> char {
        match self {
            ControlMode::Automatic => '0',
            ControlMode::Manual => '1',
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim() {
            "0" => Some(ControlMode::Automatic),
            "1" => Some(ControlMode::Manual),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Automatic => ControlMode::Manual,
            ControlMode::Manual => ControlMode::Automatic,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JogDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl JogDirection {
    pub const ALL: [JogDirection; 6] = [
        JogDirection::Forward,
        JogDirection::Backward,
        JogDirection::Left,
        JogDirection::Right,
        JogDirection::Up,
        JogDirection::Down,
    ];

    pub fn code(self) -> char {
        match self {
            JogDirection::Forward => 'F',
            JogDirection::Backward => 'B',
            JogDirection::Left => 'L',
            JogDirection::Right => 'R',
            JogDirection::Up => 'U',
            JogDirection::Down => 'D',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        JogDirection::ALL
            .into_iter()
            .find(|d| d.code() == code.to_ascii_uppercase())
    }
}

/// A PNG image as delivered by the endpoint. The bytes are never decoded here.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    png: Vec<u8>,
}

impl Frame {
    pub fn from_png(png: Vec<u8>) -> Self {
        Self { png }
    }

    pub fn from_base64(payload: &str) -> Result<Self, ProtocolError> {
        Ok(Self {
            png: STANDARD.decode(payload.trim())?,
        })
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn len(&self) -> usize {
        self.png.len()
    }

    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame").field("bytes", &self.png.len()).finish()
    }
}

impl Serialize for Frame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.data_uri())
    }
}

/// Messages pushed by the rig controller.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ServerMessage {
    Frame { frame: Frame },
    CameraList { cameras: Vec<String> },
    CoordinateX { value: String },
    CoordinateY { value: String },
    Mode { mode: ControlMode },
    /// Index into the last camera list. Sent as-is; may be out of range.
    ActiveCamera { index: i64 },
    /// `None` clears the warning.
    Homing { reason: Option<String> },
}

impl ServerMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            ServerMessage::Frame { .. } => tag::FRAME,
            ServerMessage::CameraList { .. } => tag::CAMERA_LIST,
            ServerMessage::CoordinateX { .. } => tag::COORD_X,
            ServerMessage::CoordinateY { .. } => tag::COORD_Y,
            ServerMessage::Mode { .. } => tag::MODE,
            ServerMessage::ActiveCamera { .. } => tag::ACTIVE_CAMERA,
            ServerMessage::Homing { .. } => tag::HOMING,
        }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let (t, payload) = split_tag(text)?;
        match t {
            tag::FRAME => Ok(ServerMessage::Frame {
                frame: Frame::from_base64(payload)?,
            }),
            tag::CAMERA_LIST => Ok(ServerMessage::CameraList {
                cameras: split_cameras(payload),
            }),
            tag::COORD_X => Ok(ServerMessage::CoordinateX {
                value: numeric(tag::COORD_X, payload)?,
            }),
            tag::COORD_Y => Ok(ServerMessage::CoordinateY {
                value: numeric(tag::COORD_Y, payload)?,
            }),
            tag::MODE => ControlMode::from_wire(payload)
                .map(|mode| ServerMessage::Mode { mode })
                .ok_or_else(|| invalid(tag::MODE, format!("expected 0 or 1, got {payload:?}"))),
            tag::ACTIVE_CAMERA => payload
                .trim()
                .parse::<i64>()
                .map(|index| ServerMessage::ActiveCamera { index })
                .map_err(|e| invalid(tag::ACTIVE_CAMERA, e.to_string())),
            tag::HOMING => Ok(ServerMessage::Homing {
                reason: if payload.is_empty() || payload == "0" {
                    None
                } else {
                    Some(payload.to_string())
                },
            }),
            other => Err(ProtocolError::UnknownTag(other.to_string())),
        }
    }

    pub fn encode(&self) -> String {
        let payload = match self {
            ServerMessage::Frame { frame } => frame.to_base64(),
            ServerMessage::CameraList { cameras } => {
                cameras.join(CAMERA_DELIMITER.to_string().as_str())
            }
            ServerMessage::CoordinateX { value } | ServerMessage::CoordinateY { value } => {
                value.clone()
            }
            ServerMessage::Mode { mode } => mode.wire().to_string(),
            ServerMessage::ActiveCamera { index } => index.to_string(),
            ServerMessage::Homing { reason } => reason.clone().unwrap_or_else(|| "0".to_string()),
        };
        format!("{}{payload}", self.tag())
    }
}

/// Requests sent by the panel in response to operator gestures.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ClientCommand {
    SelectCamera { index: usize },
    SetMode { mode: ControlMode },
    Jog { direction: JogDirection },
}

impl ClientCommand {
    pub fn encode(&self) -> String {
        match self {
            ClientCommand::SelectCamera { index } => format!("{}{index}", tag::SELECT_CAMERA),
            ClientCommand::SetMode { mode } => format!("{}{}", tag::MODE, mode.wire()),
            ClientCommand::Jog { direction } => format!("{}{}", tag::JOG, direction.code()),
        }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let (t, payload) = split_tag(text)?;
        match t {
            tag::SELECT_CAMERA => payload
                .trim()
                .parse::<usize>()
                .map(|index| ClientCommand::SelectCamera { index })
                .map_err(|e| invalid(tag::SELECT_CAMERA, e.to_string())),
            tag::MODE => ControlMode::from_wire(payload)
                .map(|mode| ClientCommand::SetMode { mode })
                .ok_or_else(|| invalid(tag::MODE, format!("expected 0 or 1, got {payload:?}"))),
            tag::JOG => {
                let mut chars = payload.chars();
                match (chars.next().and_then(JogDirection::from_code), chars.next()) {
                    (Some(direction), None) => Ok(ClientCommand::Jog { direction }),
                    _ => Err(invalid(tag::JOG, format!("unknown jog code {payload:?}"))),
                }
            }
            other => Err(ProtocolError::UnknownTag(other.to_string())),
        }
    }
}

fn split_tag(text: &str) -> Result<(&str, &str), ProtocolError> {
    if text.len() < TAG_LEN {
        return Err(ProtocolError::TooShort);
    }
    match (text.get(..TAG_LEN), text.get(TAG_LEN..)) {
        (Some(t), Some(payload)) => Ok((t, payload)),
        // Tag ends inside a multi-byte character, so it cannot be one of ours.
        _ => Err(ProtocolError::UnknownTag(text.chars().take(TAG_LEN).collect())),
    }
}

fn split_cameras(payload: &str) -> Vec<String> {
    // Naive splitting would yield one unnamed camera here.
    if payload.is_empty() {
        return Vec::new();
    }
    payload.split(CAMERA_DELIMITER).map(str::to_string).collect()
}

fn numeric(tag: &'static str, payload: &str) -> Result<String, ProtocolError> {
    payload
        .trim()
        .parse::<f64>()
        .map(|_| payload.trim().to_string())
        .map_err(|_| invalid(tag, format!("expected a number, got {payload:?}")))
}

fn invalid(tag: &'static str, reason: String) -> ProtocolError {
    ProtocolError::InvalidPayload { tag, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camera_list_in_order() {
        let msg = ServerMessage::decode("CASFront|Rear|Top").unwrap();
        assert_eq!(
            msg,
            ServerMessage::CameraList {
                cameras: vec!["Front".into(), "Rear".into(), "Top".into()]
            }
        );
    }

    #[test]
    fn empty_camera_list_has_no_entries() {
        let msg = ServerMessage::decode("CAS").unwrap();
        assert_eq!(msg, ServerMessage::CameraList { cameras: vec![] });
    }

    #[test]
    fn frame_payload_is_base64_png() {
        let msg = ServerMessage::decode("CAMiVBORw0KGgo=").unwrap();
        let ServerMessage::Frame { frame } = msg else {
            panic!("expected frame, got {msg:?}");
        };
        assert_eq!(frame.png(), b"\x89PNG\r\n\x1a\n");
        assert_eq!(frame.data_uri(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = ServerMessage::decode("CAM***").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidBase64(_)));
    }

    #[test]
    fn coordinates_keep_their_text() {
        assert_eq!(
            ServerMessage::decode("CXD-1").unwrap(),
            ServerMessage::CoordinateX { value: "-1".into() }
        );
        assert_eq!(
            ServerMessage::decode("CYD12.5").unwrap(),
            ServerMessage::CoordinateY { value: "12.5".into() }
        );
        assert!(matches!(
            ServerMessage::decode("CXDabc"),
            Err(ProtocolError::InvalidPayload { tag: "CXD", .. })
        ));
    }

    #[test]
    fn mode_accepts_only_zero_and_one() {
        assert_eq!(
            ServerMessage::decode("MAN1").unwrap(),
            ServerMessage::Mode { mode: ControlMode::Manual }
        );
        assert_eq!(
            ServerMessage::decode("MAN0").unwrap(),
            ServerMessage::Mode { mode: ControlMode::Automatic }
        );
        assert!(ServerMessage::decode("MAN2").is_err());
    }

    #[test]
    fn active_camera_index_is_not_bounds_checked() {
        assert_eq!(
            ServerMessage::decode("CON7").unwrap(),
            ServerMessage::ActiveCamera { index: 7 }
        );
        assert_eq!(
            ServerMessage::decode("CON-1").unwrap(),
            ServerMessage::ActiveCamera { index: -1 }
        );
        assert!(ServerMessage::decode("CONx").is_err());
    }

    #[test]
    fn homing_zero_or_empty_clears_warning() {
        assert_eq!(
            ServerMessage::decode("HOMObstruction detected").unwrap(),
            ServerMessage::Homing {
                reason: Some("Obstruction detected".into())
            }
        );
        assert_eq!(
            ServerMessage::decode("HOM0").unwrap(),
            ServerMessage::Homing { reason: None }
        );
        assert_eq!(
            ServerMessage::decode("HOM").unwrap(),
            ServerMessage::Homing { reason: None }
        );
    }

    #[test]
    fn unknown_and_short_messages_are_errors() {
        assert_eq!(
            ServerMessage::decode("CTRF"),
            Err(ProtocolError::UnknownTag("CTR".into()))
        );
        assert_eq!(ServerMessage::decode("CA"), Err(ProtocolError::TooShort));
        assert!(matches!(
            ServerMessage::decode("CAé1"),
            Err(ProtocolError::UnknownTag(_))
        ));
    }

    #[test]
    fn client_commands_use_fixed_codes() {
        let codes: String = JogDirection::ALL
            .into_iter()
            .map(|direction| ClientCommand::Jog { direction }.encode())
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(codes, "CTRF,CTRB,CTRL,CTRR,CTRU,CTRD");

        assert_eq!(ClientCommand::SelectCamera { index: 2 }.encode(), "CAM2");
        assert_eq!(
            ClientCommand::SetMode { mode: ControlMode::Manual }.encode(),
            "MAN1"
        );
    }

    #[test]
    fn client_command_decode_matches_encode() {
        for text in ["CAM0", "CAM12", "MAN0", "MAN1", "CTRL", "CTRD"] {
            assert_eq!(ClientCommand::decode(text).unwrap().encode(), text);
        }
        assert!(ClientCommand::decode("CTRX").is_err());
        assert!(ClientCommand::decode("CTRFF").is_err());
        assert!(ClientCommand::decode("CAM-1").is_err());
    }

    #[test]
    fn server_encode_is_read_back_by_decode() {
        let msgs = [
            ServerMessage::CameraList {
                cameras: vec!["Front".into(), "Rear".into()],
            },
            ServerMessage::Homing { reason: None },
            ServerMessage::Frame {
                frame: Frame::from_png(vec![1, 2, 3]),
            },
        ];
        for msg in msgs {
            assert_eq!(ServerMessage::decode(&msg.encode()).unwrap(), msg);
        }
    }

    #[test]
    fn mode_toggle_inverts() {
        assert_eq!(ControlMode::Automatic.toggled(), ControlMode::Manual);
        assert_eq!(ControlMode::Manual.toggled(), ControlMode::Automatic);
        assert_eq!(ControlMode::default(), ControlMode::Automatic);
    }
}
