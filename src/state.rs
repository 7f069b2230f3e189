//! Shared application state and the canvas data model.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds exactly one canvas `Session` behind a single async mutex: every
//! mutation of strokes, participants, colors, and history happens while that
//! lock is held, which is what gives each connection its in-order view.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::Config;
use crate::services::session::Session;

/// Opaque, connection-scoped participant identity. A reconnecting client
/// always gets a fresh one.
pub type ConnectionId = Uuid;

// =============================================================================
// GEOMETRY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

impl Cursor {
    /// Where every participant starts: origin, not shown.
    pub const HIDDEN: Cursor = Cursor { x: 0.0, y: 0.0, visible: false };
}

// =============================================================================
// STROKES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
}

/// Position of a fragment within one pen-down → pen-up motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokePhase {
    Start,
    Continue,
    End,
}

/// One logged drawing fragment. Immutable once logged except for `color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub id: String,
    pub user_id: ConnectionId,
    pub points: Vec<Point>,
    pub color: String,
    pub size: f64,
    pub tool: Tool,
    pub phase: StrokePhase,
    pub timestamp: i64,
}

/// A stroke before it enters the log. The log fills in `id` and `timestamp`
/// when they are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDraft {
    pub id: Option<String>,
    pub user_id: ConnectionId,
    pub points: Vec<Point>,
    pub color: String,
    pub size: f64,
    pub tool: Tool,
    pub phase: StrokePhase,
    pub timestamp: Option<i64>,
}

impl From<Stroke> for StrokeDraft {
    fn from(stroke: Stroke) -> Self {
        Self {
            id: Some(stroke.id),
            user_id: stroke.user_id,
            points: stroke.points,
            color: stroke.color,
            size: stroke.size,
            tool: stroke.tool,
            phase: stroke.phase,
            timestamp: Some(stroke.timestamp),
        }
    }
}

// =============================================================================
// PARTICIPANTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ConnectionId,
    pub color: String,
    pub cursor: Cursor,
    /// Milliseconds since Unix epoch.
    pub joined_at: i64,
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let session = Session::new(config.stroke_log_capacity, config.overflow_policy, config.recolor_policy);
        Self { session: Arc::new(Mutex::new(session)), config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
