//! Session coordinator — the single owner of canvas state.
//!
//! DESIGN
//! ======
//! A `Session` owns the participant registry, stroke log, history stack, and
//! broadcast relay. Nothing else mutates them. Callers hold the session lock
//! for the duration of one call, so every call is atomic with respect to
//! every other connection.
//!
//! LIFECYCLE
//! =========
//! A connection is `Connecting` until `join` returns, `Active` while it is
//! in both the registry and the relay, and `Disconnected` after `leave` (or
//! after the relay evicts it, which also announces `user-disconnected`).
//! Events from a connection that is not Active are dropped without a trace
//! on the wire.
//!
//! 1. `join`: register → queue `init` snapshot to the joiner → announce
//!    `user-connected` to everyone else.
//! 2. `handle`: apply one client event → fan the result out.
//! 3. `leave`: unregister → announce `user-disconnected`. Idempotent.
//!
//! The snapshot is queued into the joiner's channel before the joiner can
//! receive any fan-out, and both happen under the same lock, so the joiner
//! sees every stroke exactly once: in `init` or in a later `remote-draw*`.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::events::{ClientEvent, CursorView, DrawInput, ServerEvent, Snapshot};
use crate::frame::Frame;
use crate::services::history::History;
use crate::services::registry::Registry;
use crate::services::relay::{OverflowPolicy, Relay};
use crate::services::stroke_log::StrokeLog;
use crate::state::{ConnectionId, Cursor, Participant, Point, StrokeDraft, StrokePhase};

const DEFAULT_BRUSH_SIZE: f64 = 5.0;
const FALLBACK_COLOR: &str = "#000000";

/// Whether a color change rewrites the participant's existing strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecolorPolicy {
    /// Only strokes drawn after the change use the new color.
    ForwardOnly,
    /// Every logged brush stroke by the participant takes the new color.
    Retroactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_users: usize,
    pub total_strokes: usize,
    /// Undone strokes waiting for a redo.
    pub total_undo: usize,
    /// Strokes restored by redo since the canvas last moved on.
    pub total_redo: usize,
}

#[derive(Debug)]
pub struct Session {
    registry: Registry,
    log: StrokeLog,
    history: History,
    relay: Relay,
    recolor: RecolorPolicy,
}

impl Session {
    #[must_use]
    pub fn new(log_capacity: usize, overflow: OverflowPolicy, recolor: RecolorPolicy) -> Self {
        let log = StrokeLog::new(log_capacity);
        let history = History::new(log.capacity());
        Self {
            registry: Registry::new(),
            log,
            history,
            relay: Relay::new(overflow),
            recolor,
        }
    }

    // =========================================================================
    // CONNECT / DISCONNECT
    // =========================================================================

    /// Admit a new connection. `tx` is the connection's outbound queue; the
    /// `init` snapshot is the first frame placed on it.
    pub fn join(&mut self, id: ConnectionId, tx: mpsc::Sender<Frame>) -> Participant {
        let participant = self.registry.add(id);
        let snapshot = self.snapshot_for(id, &participant.color);
        let strokes = snapshot.strokes.len();

        self.relay.register(id, tx);
        self.relay.send_to(id, Frame::from(&ServerEvent::Init(snapshot)));
        let notified = self.broadcast(&ServerEvent::UserConnected(participant.clone()), Some(id));

        info!(client_id = %id, color = %participant.color, strokes, notified, "session: participant joined");
        participant
    }

    /// Evict a connection and announce its departure. Returns the removed
    /// participant, or `None` if it had already left.
    pub fn leave(&mut self, id: ConnectionId) -> Option<Participant> {
        self.relay.unregister(id);
        let participant = self.registry.remove(id)?;
        let notified = self.broadcast(
            &ServerEvent::UserDisconnected { user_id: id, color: participant.color.clone() },
            None,
        );

        info!(client_id = %id, remaining = self.registry.len(), notified, "session: participant left");
        Some(participant)
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Apply one client event and fan out the result. Returns how many
    /// connections were notified.
    pub fn handle(&mut self, id: ConnectionId, event: ClientEvent) -> usize {
        if !self.is_active(id) {
            debug!(client_id = %id, "session: event from inactive connection dropped");
            return 0;
        }

        match event {
            ClientEvent::Draw(phase, input) => {
                let draft = self.stroke_draft(id, phase, input);
                let stroke = self.log.append(draft);
                self.history.invalidate();
                self.broadcast(&ServerEvent::RemoteDraw(stroke), Some(id))
            }
            ClientEvent::CursorMove(input) => {
                let cursor = Cursor::from(input);
                let Some(color) = self.registry.set_cursor(id, cursor) else {
                    return 0;
                };
                let view = CursorView { x: cursor.x, y: cursor.y, visible: cursor.visible, color: color.to_owned() };
                self.broadcast(&ServerEvent::RemoteCursorMove { user_id: id, cursor: view }, Some(id))
            }
            ClientEvent::ColorChange(color) => self.change_color(id, color.trim()),
            ClientEvent::ClearCanvas => {
                self.log.clear();
                self.history.invalidate();
                info!(client_id = %id, "session: canvas cleared");
                // The sender clears its own view on the echo.
                self.broadcast(&ServerEvent::RemoteClearCanvas, None)
            }
            ClientEvent::Undo => {
                let Some(stroke) = self.history.undo(&mut self.log) else {
                    return 0;
                };
                self.broadcast(&ServerEvent::RemoteUndo { user_id: id, stroke }, None)
            }
            ClientEvent::Redo => {
                let Some(stroke) = self.history.redo(&mut self.log) else {
                    return 0;
                };
                self.broadcast(&ServerEvent::RemoteRedo { user_id: id, stroke }, None)
            }
        }
    }

    fn change_color(&mut self, id: ConnectionId, color: &str) -> usize {
        if color.is_empty() || self.registry.set_color(id, color).is_none() {
            return 0;
        }

        let retroactive = self.recolor == RecolorPolicy::Retroactive;
        if retroactive {
            let changed = self.log.recolor(id, color) + self.history.recolor(id, color);
            debug!(client_id = %id, changed, "session: strokes recolored");
        }

        // A retroactive change rewrote the sender's logged strokes too, so the
        // sender repaints from the echo like everyone else.
        let exclude = if retroactive { None } else { Some(id) };
        self.broadcast(
            &ServerEvent::RemoteColorChange { user_id: id, color: color.to_owned(), retroactive },
            exclude,
        )
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Connected and reachable: registered and still holding a relay slot.
    #[must_use]
    pub fn is_active(&self, id: ConnectionId) -> bool {
        self.registry.contains(id) && self.relay.contains(id)
    }

    #[cfg(test)]
    #[must_use]
    pub fn strokes(&self) -> Vec<crate::state::Stroke> {
        self.log.all()
    }

    #[cfg(test)]
    #[must_use]
    pub fn participants(&self) -> Vec<Participant> {
        self.registry.list(None)
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            total_users: self.registry.len(),
            total_strokes: self.log.len(),
            total_undo: self.history.depth(),
            total_redo: self.history.redone(),
        }
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn broadcast(&mut self, event: &ServerEvent, exclude: Option<ConnectionId>) -> usize {
        let notified = self.relay.fan_out(&Frame::from(event), exclude);
        self.reap_evicted();
        notified
    }

    /// Announce connections the relay evicted for overflowing. Their socket
    /// tasks may be stuck on a dead peer, so peers are told now rather than
    /// when those tasks get around to `leave`.
    fn reap_evicted(&mut self) {
        let mut pending = self.relay.take_evicted();
        while let Some(id) = pending.pop() {
            let Some(participant) = self.registry.remove(id) else {
                continue;
            };
            let gone = ServerEvent::UserDisconnected { user_id: id, color: participant.color };
            let notified = self.relay.fan_out(&Frame::from(&gone), None);
            pending.extend(self.relay.take_evicted());
            info!(client_id = %id, notified, "session: evicted participant removed");
        }
    }

    fn snapshot_for(&self, id: ConnectionId, color: &str) -> Snapshot {
        Snapshot {
            user_id: id,
            color: color.to_owned(),
            strokes: self.log.all(),
            users: self
                .registry
                .list(Some(id))
                .into_iter()
                .map(|p| (p.id, p))
                .collect(),
        }
    }

    /// Fill in what the client left out: its current color, the default
    /// brush size, and a one-point geometry from `x`/`y`.
    fn stroke_draft(&self, id: ConnectionId, phase: StrokePhase, input: DrawInput) -> StrokeDraft {
        let color = input
            .color
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.registry.get(id).map(|p| p.color.clone()))
            .unwrap_or_else(|| FALLBACK_COLOR.to_owned());
        let size = input
            .size
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_BRUSH_SIZE);
        let points = if input.points.is_empty() { vec![Point { x: input.x, y: input.y }] } else { input.points };

        StrokeDraft {
            id: None,
            user_id: id,
            points,
            color,
            size,
            tool: input.tool.unwrap_or_default(),
            phase,
            timestamp: input.timestamp,
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
