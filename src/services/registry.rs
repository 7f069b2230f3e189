//! Participant registry — who is live, their color, and their cursor.
//!
//! Every operation on an unknown id is a silent no-op: a disconnect can race
//! in-flight events from the same connection, and neither side is an error.

use std::collections::HashMap;

use crate::frame::now_ms;
use crate::services::palette::ColorAllocator;
use crate::state::{ConnectionId, Cursor, Participant};

#[derive(Debug, Default)]
pub struct Registry {
    participants: HashMap<ConnectionId, Participant>,
    colors: ColorAllocator,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant with a freshly allocated color and a hidden
    /// cursor at the origin. Re-adding a live id returns the existing entry.
    pub fn add(&mut self, id: ConnectionId) -> Participant {
        if let Some(existing) = self.participants.get(&id) {
            return existing.clone();
        }
        let participant = Participant { id, color: self.colors.allocate(), cursor: Cursor::HIDDEN, joined_at: now_ms() };
        self.participants.insert(id, participant.clone());
        participant
    }

    /// Remove a participant and release its color. Returns the removed
    /// entry, or `None` if it was already gone.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Participant> {
        let participant = self.participants.remove(&id)?;
        self.colors.release(&participant.color);
        Some(participant)
    }

    /// Switch a participant's color. Returns the previous color when the
    /// participant exists.
    pub fn set_color(&mut self, id: ConnectionId, color: &str) -> Option<String> {
        let participant = self.participants.get_mut(&id)?;
        let previous = std::mem::replace(&mut participant.color, color.to_owned());
        self.colors.hold(color);
        self.colors.release(&previous);
        Some(previous)
    }

    /// Record a cursor position. Returns the participant's current color for
    /// enriching the broadcast.
    pub fn set_cursor(&mut self, id: ConnectionId, cursor: Cursor) -> Option<&str> {
        let participant = self.participants.get_mut(&id)?;
        participant.cursor = cursor;
        Some(participant.color.as_str())
    }

    #[must_use]
    pub fn get(&self, id: ConnectionId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.participants.contains_key(&id)
    }

    /// All live participants, optionally leaving one out.
    #[must_use]
    pub fn list(&self, excluding: Option<ConnectionId>) -> Vec<Participant> {
        self.participants
            .values()
            .filter(|p| excluding != Some(p.id))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
