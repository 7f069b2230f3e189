//! Stroke log — the ordered, bounded record new joiners replay.
//!
//! DESIGN
//! ======
//! Append-only except for three operations: `clear` (drop everything),
//! `pop_last` (undo), and in-place `recolor`. Positions never change.
//!
//! TRADE-OFFS
//! ==========
//! When the log grows past `capacity` it is cut back to the newest
//! `capacity / 2` entries in one step instead of evicting one entry per
//! append. That keeps appends amortized O(1) at the cost of history: a
//! participant joining after a truncation sees a canvas missing its oldest
//! strokes. History is not guaranteed complete.

use rand::Rng;
use tracing::info;

use crate::frame::now_ms;
use crate::state::{ConnectionId, Stroke, StrokeDraft, Tool};

const ID_SUFFIX_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
/// Browser clients erase by painting the background color with the brush.
const BACKGROUND_COLOR: &str = "#ffffff";

#[derive(Debug)]
pub struct StrokeLog {
    strokes: Vec<Stroke>,
    capacity: usize,
}

impl StrokeLog {
    /// `capacity` is clamped to at least 2 so a truncation always keeps
    /// something.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self { strokes: Vec::with_capacity(capacity + 1), capacity }
    }

    /// Log a stroke, filling in `id` and `timestamp` when absent. Returns the
    /// logged copy for broadcast.
    pub fn append(&mut self, draft: StrokeDraft) -> Stroke {
        let timestamp = draft.timestamp.unwrap_or_else(now_ms);
        let stroke = Stroke {
            id: draft.id.unwrap_or_else(|| stroke_id(timestamp)),
            user_id: draft.user_id,
            points: draft.points,
            color: draft.color,
            size: draft.size,
            tool: draft.tool,
            phase: draft.phase,
            timestamp,
        };
        self.strokes.push(stroke.clone());

        if self.strokes.len() > self.capacity {
            let keep = self.capacity / 2;
            let dropped = self.strokes.len() - keep;
            self.strokes.drain(..dropped);
            info!(dropped, kept = keep, "stroke log truncated");
        }
        stroke
    }

    /// Copy of the whole log in order.
    #[must_use]
    pub fn all(&self) -> Vec<Stroke> {
        self.strokes.clone()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn pop_last(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    /// Rewrite the color of every stroke owned by `user_id`, erasures aside.
    /// Returns how many strokes changed.
    pub fn recolor(&mut self, user_id: ConnectionId, color: &str) -> usize {
        recolor_strokes(&mut self.strokes, user_id, color)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Shared with the history stack so undone strokes recolor the same way.
pub(crate) fn recolor_strokes<'a>(
    strokes: impl IntoIterator<Item = &'a mut Stroke>,
    user_id: ConnectionId,
    color: &str,
) -> usize {
    let mut changed = 0;
    for stroke in strokes {
        if stroke.user_id == user_id && !is_erasure(stroke) && stroke.color != color {
            color.clone_into(&mut stroke.color);
            changed += 1;
        }
    }
    changed
}

/// Erasures keep their color through a recolor: either the eraser tool or a
/// brush painting the background.
fn is_erasure(stroke: &Stroke) -> bool {
    stroke.tool == Tool::Eraser || stroke.color.eq_ignore_ascii_case(BACKGROUND_COLOR)
}

/// `<millis>-<random base36>`: unique enough for a single process, not a
/// cryptographic guarantee.
fn stroke_id(timestamp: i64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("{timestamp}-{suffix}")
}

#[cfg(test)]
#[path = "stroke_log_test.rs"]
mod tests;
