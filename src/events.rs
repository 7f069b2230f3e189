//! Typed canvas events on top of the `Frame` envelope.
//!
//! DESIGN
//! ======
//! Inbound frames are decoded into `ClientEvent` exactly once, at the edge,
//! so the session never sees raw JSON. Outbound state changes are expressed
//! as `ServerEvent` and rendered into frames with their wire names.
//!
//! | inbound                         | outbound                                       |
//! |---------------------------------|------------------------------------------------|
//! | `draw-start` `draw` `draw-end`  | `remote-draw-start` `remote-draw` `remote-draw-end` |
//! | `cursor-move`                   | `remote-cursor-move`                           |
//! | `color-change`                  | `remote-color-change`                          |
//! | `clear-canvas`                  | `remote-clear-canvas`                          |
//! | `undo` `redo`                   | `remote-undo` `remote-redo`                    |
//! | (connect / disconnect)          | `init` `user-connected` `user-disconnected`    |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::state::{ConnectionId, Cursor, Participant, Point, Stroke, StrokePhase, Tool};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Well-formed frame naming an event this server does not speak.
    #[error("unknown event: {0}")]
    Unknown(String),
    /// Known event whose payload does not match its schema.
    #[error("invalid {event} payload: {source}")]
    Payload { event: String, source: serde_json::Error },
}

// =============================================================================
// INBOUND
// =============================================================================

/// Pointer sample from a client. Either a single `{x, y}` or a batch of
/// `points`; everything else falls back to server-side defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawInput {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub points: Vec<Point>,
    pub size: Option<f64>,
    pub color: Option<String>,
    pub tool: Option<Tool>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CursorInput {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

fn default_visible() -> bool {
    true
}

impl From<CursorInput> for Cursor {
    fn from(input: CursorInput) -> Self {
        Cursor { x: input.x, y: input.y, visible: input.visible }
    }
}

/// `color-change` carries a bare string; `{ "color": ... }` is accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorInput {
    Bare(String),
    Wrapped { color: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Draw(StrokePhase, DrawInput),
    CursorMove(CursorInput),
    ColorChange(String),
    ClearCanvas,
    Undo,
    Redo,
}

impl TryFrom<Frame> for ClientEvent {
    type Error = EventError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        let Frame { event, data, .. } = frame;
        match event.as_str() {
            "draw-start" => Ok(Self::Draw(StrokePhase::Start, payload(&event, data)?)),
            "draw" => Ok(Self::Draw(StrokePhase::Continue, payload(&event, data)?)),
            "draw-end" => Ok(Self::Draw(StrokePhase::End, payload(&event, data)?)),
            "cursor-move" => Ok(Self::CursorMove(payload(&event, data)?)),
            "color-change" => {
                let color = match payload::<ColorInput>(&event, data)? {
                    ColorInput::Bare(color) | ColorInput::Wrapped { color } => color,
                };
                Ok(Self::ColorChange(color))
            }
            "clear-canvas" => Ok(Self::ClearCanvas),
            "undo" => Ok(Self::Undo),
            "redo" => Ok(Self::Redo),
            _ => Err(EventError::Unknown(event)),
        }
    }
}

fn payload<T: for<'de> Deserialize<'de>>(event: &str, data: serde_json::Value) -> Result<T, EventError> {
    serde_json::from_value(data).map_err(|source| EventError::Payload { event: event.to_owned(), source })
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// Everything a joiner needs to paint the current canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub user_id: ConnectionId,
    pub color: String,
    pub strokes: Vec<Stroke>,
    /// Everyone else, keyed by participant id.
    pub users: HashMap<ConnectionId, Participant>,
}

/// Cursor as peers see it: position plus the owner's color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorView {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Init(Snapshot),
    RemoteDraw(Stroke),
    RemoteCursorMove { user_id: ConnectionId, cursor: CursorView },
    RemoteColorChange { user_id: ConnectionId, color: String, retroactive: bool },
    RemoteClearCanvas,
    RemoteUndo { user_id: ConnectionId, stroke: Stroke },
    RemoteRedo { user_id: ConnectionId, stroke: Stroke },
    UserConnected(Participant),
    UserDisconnected { user_id: ConnectionId, color: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CursorMovePayload<'a> {
    user_id: ConnectionId,
    cursor: &'a CursorView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ColorChangePayload<'a> {
    user_id: ConnectionId,
    color: &'a str,
    retroactive: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryPayload<'a> {
    user_id: ConnectionId,
    stroke: &'a Stroke,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresencePayload<'a> {
    user_id: ConnectionId,
    color: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<Cursor>,
}

impl ServerEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::RemoteDraw(stroke) => match stroke.phase {
                StrokePhase::Start => "remote-draw-start",
                StrokePhase::Continue => "remote-draw",
                StrokePhase::End => "remote-draw-end",
            },
            Self::RemoteCursorMove { .. } => "remote-cursor-move",
            Self::RemoteColorChange { .. } => "remote-color-change",
            Self::RemoteClearCanvas => "remote-clear-canvas",
            Self::RemoteUndo { .. } => "remote-undo",
            Self::RemoteRedo { .. } => "remote-redo",
            Self::UserConnected(_) => "user-connected",
            Self::UserDisconnected { .. } => "user-disconnected",
        }
    }
}

impl From<&ServerEvent> for Frame {
    fn from(event: &ServerEvent) -> Self {
        let name = event.name();
        match event {
            ServerEvent::Init(snapshot) => Frame::encode(name, snapshot),
            ServerEvent::RemoteDraw(stroke) => Frame::encode(name, stroke),
            ServerEvent::RemoteCursorMove { user_id, cursor } => {
                Frame::encode(name, &CursorMovePayload { user_id: *user_id, cursor })
            }
            ServerEvent::RemoteColorChange { user_id, color, retroactive } => {
                Frame::encode(name, &ColorChangePayload { user_id: *user_id, color, retroactive: *retroactive })
            }
            ServerEvent::RemoteClearCanvas => Frame::bare(name),
            ServerEvent::RemoteUndo { user_id, stroke } | ServerEvent::RemoteRedo { user_id, stroke } => {
                Frame::encode(name, &HistoryPayload { user_id: *user_id, stroke })
            }
            ServerEvent::UserConnected(participant) => Frame::encode(
                name,
                &PresencePayload { user_id: participant.id, color: &participant.color, cursor: Some(participant.cursor) },
            ),
            ServerEvent::UserDisconnected { user_id, color } => {
                Frame::encode(name, &PresencePayload { user_id: *user_id, color, cursor: None })
            }
        }
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
