//! Broadcast relay — fan-out of frames to live connections.
//!
//! DESIGN
//! ======
//! Each connection owns a bounded outbound queue drained by its own socket
//! task. The relay only ever `try_send`s into those queues, so a slow or
//! stuck peer can never stall the session lock or delivery to anyone else.
//!
//! What happens when a queue is full is the overflow policy:
//! - `Drop` skips that frame for that peer. The peer's canvas may diverge
//!   until it reconnects.
//! - `Disconnect` evicts the peer. Dropping its sender closes the queue,
//!   the socket task notices, and the client reconnects into a fresh
//!   snapshot instead of drawing from a gapped stream. Evicted ids are kept
//!   for the session to collect with `take_evicted`.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use crate::frame::Frame;
use crate::state::ConnectionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    Drop,
    Disconnect,
}

#[derive(Debug)]
pub struct Relay {
    peers: HashMap<ConnectionId, mpsc::Sender<Frame>>,
    policy: OverflowPolicy,
    /// Evicted since the last `take_evicted`.
    evicted: Vec<ConnectionId>,
}

impl Relay {
    #[must_use]
    pub fn new(policy: OverflowPolicy) -> Self {
        Self { peers: HashMap::new(), policy, evicted: Vec::new() }
    }

    pub fn register(&mut self, id: ConnectionId, tx: mpsc::Sender<Frame>) {
        self.peers.insert(id, tx);
    }

    /// Forget a connection. Returns whether it was registered.
    pub fn unregister(&mut self, id: ConnectionId) -> bool {
        self.peers.remove(&id).is_some()
    }

    /// Deliver a frame to a single connection. Returns whether it was queued.
    pub fn send_to(&mut self, id: ConnectionId, frame: Frame) -> bool {
        let Some(tx) = self.peers.get(&id) else {
            return false;
        };
        match tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.overflowed(id);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Deliver a frame to every connection except `exclude`. Returns how many
    /// connections had it queued.
    pub fn fan_out(&mut self, frame: &Frame, exclude: Option<ConnectionId>) -> usize {
        let mut delivered = 0;
        let mut full = Vec::new();

        for (id, tx) in &self.peers {
            if exclude == Some(*id) {
                continue;
            }
            match tx.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => full.push(*id),
                // Mid-disconnect; the socket task will unregister it.
                Err(TrySendError::Closed(_)) => {}
            }
        }

        for id in full {
            self.overflowed(id);
        }
        delivered
    }

    fn overflowed(&mut self, id: ConnectionId) {
        match self.policy {
            OverflowPolicy::Drop => {
                warn!(client_id = %id, "relay: outbound queue full, frame dropped");
            }
            OverflowPolicy::Disconnect => {
                if self.peers.remove(&id).is_some() {
                    self.evicted.push(id);
                }
                warn!(client_id = %id, "relay: outbound queue full, evicting connection");
            }
        }
    }

    /// Connections evicted for overflowing since the last call. The session
    /// announces their departure; their socket tasks may still be blocked.
    pub fn take_evicted(&mut self) -> Vec<ConnectionId> {
        std::mem::take(&mut self.evicted)
    }

    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.peers.contains_key(&id)
    }
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
