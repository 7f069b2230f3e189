//! Color allocator — hands each joining participant a distinct color.
//!
//! DESIGN
//! ======
//! A fixed palette is scanned in order and the first entry nobody currently
//! holds wins. Holds are reference counted rather than a plain set: the
//! random fallback and user-chosen colors can legitimately collide, and a
//! color must stay held until the last holder releases it.

use std::collections::HashMap;

use rand::Rng;

/// Visually distinct defaults, ordered so early joiners get the most
/// contrasting hues.
pub const PALETTE: [&str; 10] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#9a6324", "#469990", "#800000",
];

#[derive(Debug, Default)]
pub struct ColorAllocator {
    held: HashMap<String, usize>,
}

impl ColorAllocator {
    /// Pick the first unheld palette color, or a random one once the palette
    /// is exhausted. Never fails.
    pub fn allocate(&mut self) -> String {
        let color = PALETTE
            .iter()
            .find(|c| !self.is_held(c))
            .map_or_else(random_color, |c| (*c).to_owned());
        self.hold(&color);
        color
    }

    /// Mark an arbitrary color as held, e.g. one a participant picked.
    pub fn hold(&mut self, color: &str) {
        *self.held.entry(color.to_owned()).or_insert(0) += 1;
    }

    /// Drop one hold on `color`. Releasing an unheld color is a no-op.
    pub fn release(&mut self, color: &str) {
        let Some(count) = self.held.get_mut(color) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.held.remove(color);
        }
    }

    #[must_use]
    pub fn is_held(&self, color: &str) -> bool {
        self.held.contains_key(color)
    }
}

/// Fallback when every palette entry is taken. Same shape the browser
/// client already renders: a saturated HSL hue.
fn random_color() -> String {
    let hue: u16 = rand::rng().random_range(0..360);
    format!("hsl({hue}, 70%, 60%)")
}

#[cfg(test)]
#[path = "palette_test.rs"]
mod tests;
