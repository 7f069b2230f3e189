//! WebSocket handler — one task per connection.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, joins the canvas session, and enters a
//! `select!` loop:
//! - Incoming client frames → decode → `Session::handle` under the lock
//! - Frames queued for this client by the relay → forward to the socket
//! - Ping ticks → liveness check and keepalive
//!
//! Inbound frames are processed strictly one at a time, which is what keeps
//! a single participant's events in order for every peer.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → `Session::join` queues `init` for this client
//! 2. Client frames → decode → session applies and fans out
//! 3. Close, malformed frame, idle timeout, failed or stalled send, or relay
//!    eviction → leave the loop
//! 4. `Session::leave` → peers get `user-disconnected`

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, timeout};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::{ClientEvent, EventError};
use crate::frame::Frame;
use crate::state::AppState;

/// What became of one inbound text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inbound {
    /// Decoded and handed to the session; carries the fan-out count.
    Applied(usize),
    /// Valid envelope, event name we do not speak.
    Ignored,
    /// Not a frame, or a known event with a bad payload. Evicts the client.
    Malformed,
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection queue the relay fills; drained only by this task.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.config.outbound_buffer);
    state.session.lock().await.join(client_id, client_tx);
    info!(%client_id, "ws: client connected");

    let mut ping = tokio::time::interval(state.config.ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ping.reset();
    let mut last_seen = Instant::now();

    let reason = loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break "closed" };
                last_seen = Instant::now();
                match msg {
                    Message::Text(text) => {
                        if process_inbound_text(&state, client_id, text.as_str()).await == Inbound::Malformed {
                            break "malformed frame";
                        }
                    }
                    Message::Close(_) => break "closed",
                    _ => {}
                }
            }
            frame = client_rx.recv() => {
                // The relay dropped our sender: evicted for overflowing.
                let Some(frame) = frame else { break "evicted" };
                // A peer that stopped reading must not pin this task forever.
                match timeout(state.config.idle_timeout, send_frame(&mut socket, &frame)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(())) => break "send failed",
                    Err(_) => break "send timed out",
                }
            }
            _ = ping.tick() => {
                if last_seen.elapsed() > state.config.idle_timeout {
                    break "idle timeout";
                }
                match timeout(state.config.idle_timeout, socket.send(Message::Ping(Bytes::new()))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => break "send failed",
                    Err(_) => break "send timed out",
                }
            }
        }
    };

    state.session.lock().await.leave(client_id);
    info!(%client_id, reason, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Decode one inbound text message and apply it to the session.
///
/// Kept apart from the socket so tests can drive dispatch directly.
async fn process_inbound_text(state: &AppState, client_id: Uuid, text: &str) -> Inbound {
    let frame = match Frame::parse(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            return Inbound::Malformed;
        }
    };

    if frame.event != "cursor-move" {
        debug!(%client_id, event = %frame.event, "ws: recv frame");
    }

    let event = match ClientEvent::try_from(frame) {
        Ok(event) => event,
        Err(EventError::Unknown(name)) => {
            debug!(%client_id, event = %name, "ws: unknown event ignored");
            return Inbound::Ignored;
        }
        Err(e) => {
            warn!(%client_id, error = %e, "ws: malformed event");
            return Inbound::Malformed;
        }
    };

    let notified = state.session.lock().await.handle(client_id, event);
    Inbound::Applied(notified)
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match frame.to_json() {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, event = %frame.event, "ws: failed to serialize frame");
            return Err(());
        }
    };
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
