//! History stack — global undo/redo layered over the stroke log.
//!
//! DESIGN
//! ======
//! Undo is canvas-wide: it retracts the newest logged fragment whoever drew
//! it. The undone fragments wait on a stack so `redo` can put them back at
//! the tail of the log. Anything new reaching the log (a fresh stroke or a
//! clear) discards that stack, so there is never a redo past the point where
//! the canvas moved on.

use crate::services::stroke_log::{StrokeLog, recolor_strokes};
use crate::state::{ConnectionId, Stroke};

#[derive(Debug)]
pub struct History {
    undone: Vec<Stroke>,
    /// Redos applied since the last `invalidate`.
    redone: usize,
    limit: usize,
}

impl History {
    /// `limit` bounds the undo stack; the oldest undone fragment falls off
    /// first.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { undone: Vec::new(), redone: 0, limit: limit.max(1) }
    }

    /// Retract the newest stroke from `log`. `None` when the log is empty.
    pub fn undo(&mut self, log: &mut StrokeLog) -> Option<Stroke> {
        let stroke = log.pop_last()?;
        self.undone.push(stroke.clone());
        if self.undone.len() > self.limit {
            self.undone.remove(0);
        }
        Some(stroke)
    }

    /// Restore the most recently undone stroke to the tail of `log`. `None`
    /// when nothing is waiting.
    pub fn redo(&mut self, log: &mut StrokeLog) -> Option<Stroke> {
        let stroke = self.undone.pop()?;
        self.redone += 1;
        Some(log.append(stroke.into()))
    }

    /// The canvas moved on; undone strokes can no longer be redone.
    pub fn invalidate(&mut self) {
        self.undone.clear();
        self.redone = 0;
    }

    /// Keep waiting strokes consistent with a retroactive recolor.
    pub fn recolor(&mut self, user_id: ConnectionId, color: &str) -> usize {
        recolor_strokes(&mut self.undone, user_id, color)
    }

    /// Number of strokes that can be redone.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.undone.len()
    }

    #[must_use]
    pub fn redone(&self) -> usize {
        self.redone
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
